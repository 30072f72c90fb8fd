//! Confidence-weighted trust fusion.
//!
//! Each signal contributes its anomaly score in proportion to its configured
//! weight *and* its own confidence, so an analyzer that had nothing to look
//! at cannot drag the score either way:
//!
//! ```text
//! raw   = 100 × (1 − Σ wᵢcᵢaᵢ / Σ wᵢcᵢ)
//! E     = Σ wᵢcᵢ / Σ wᵢ
//! score = neutral + (raw − neutral) × min(1, E / min_evidence)
//! ```
//!
//! `E` is the share of the total weight actually backed by evidence. When
//! it falls below `fusion.min_evidence` the score is shrunk toward
//! `fusion.neutral_score`; with no evidence at all the score *is* neutral.
//! The shrink factor depends only on confidences, so raising any anomaly
//! score never raises the trust score.

use crate::config::FusionConfig;
use crate::types::{SignalKind, SignalResult, TrustResult};
use tracing::debug;

/// Configured weight of a signal kind.
pub fn weight(config: &FusionConfig, kind: SignalKind) -> f64 {
    match kind {
        SignalKind::Ela => config.ela_weight,
        SignalKind::Metadata => config.metadata_weight,
        SignalKind::Shadow => config.shadow_weight,
    }
}

/// Fuse the signals into a trust score in `[0, 100]`.
///
/// The returned [`TrustResult`] lists one signal per kind in
/// [`SignalKind::ALL`] order. A kind missing from `signals` is treated as a
/// zero-confidence signal; if a kind appears twice the first one wins.
pub fn fuse(signals: &[SignalResult], config: &FusionConfig) -> TrustResult {
    let ordered: Vec<SignalResult> = SignalKind::ALL
        .iter()
        .map(|&kind| {
            signals
                .iter()
                .find(|s| s.kind == kind)
                .cloned()
                .unwrap_or_else(|| SignalResult::new(kind, 0.0, 0.0))
        })
        .collect();

    let total_weight: f64 = SignalKind::ALL.iter().map(|&k| weight(config, k)).sum();
    let mut backed = 0.0f64;
    let mut weighted_anomaly = 0.0f64;
    for signal in &ordered {
        let wc = weight(config, signal.kind) * signal.confidence;
        backed += wc;
        weighted_anomaly += wc * signal.anomaly_score;
    }

    let neutral = config.neutral_score as f64;
    let score = if backed <= 0.0 || total_weight <= 0.0 {
        neutral
    } else {
        let raw = 100.0 * (1.0 - weighted_anomaly / backed);
        let evidence = backed / total_weight;
        let shrink = if config.min_evidence > 0.0 {
            (evidence / config.min_evidence).min(1.0)
        } else {
            1.0
        };
        neutral + (raw - neutral) * shrink
    };
    let trust_score = score.round().clamp(0.0, 100.0) as u8;

    debug!(trust_score, evidence = backed / total_weight.max(f64::EPSILON), "signals fused");

    TrustResult {
        trust_score,
        signals: ordered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(kind: SignalKind, anomaly: f64, confidence: f64) -> SignalResult {
        SignalResult::new(kind, anomaly, confidence)
    }

    fn fuse_default(ela: (f64, f64), metadata: (f64, f64), shadow: (f64, f64)) -> u8 {
        fuse(
            &[
                signal(SignalKind::Ela, ela.0, ela.1),
                signal(SignalKind::Metadata, metadata.0, metadata.1),
                signal(SignalKind::Shadow, shadow.0, shadow.1),
            ],
            &FusionConfig::default(),
        )
        .trust_score
    }

    // =========================================================================
    // Score value tests
    // =========================================================================

    #[test]
    fn confident_clean_signals_score_100() {
        assert_eq!(fuse_default((0.0, 1.0), (0.0, 1.0), (0.0, 1.0)), 100);
    }

    #[test]
    fn confident_anomalous_signals_score_0() {
        assert_eq!(fuse_default((1.0, 1.0), (1.0, 1.0), (1.0, 1.0)), 0);
    }

    #[test]
    fn zero_confidence_is_neutral() {
        assert_eq!(fuse_default((1.0, 0.0), (0.7, 0.0), (0.2, 0.0)), 50);
    }

    #[test]
    fn no_signals_is_neutral() {
        let result = fuse(&[], &FusionConfig::default());
        assert_eq!(result.trust_score, 50);
        assert_eq!(result.signals.len(), 3);
    }

    #[test]
    fn neutral_score_is_configurable() {
        let config = FusionConfig {
            neutral_score: 40,
            ..FusionConfig::default()
        };
        assert_eq!(fuse(&[], &config).trust_score, 40);
    }

    #[test]
    fn single_confident_signal_dominates() {
        // Only metadata has evidence: raw = 100 × (1 − 0.9) = 10,
        // E = 0.29 × 0.9 / 1.0 = 0.261 < 0.35, shrink = 0.7457
        // score = 50 + (10 − 50) × 0.7457 = 20.17
        assert_eq!(fuse_default((0.0, 0.0), (0.9, 0.9), (0.0, 0.0)), 20);
    }

    #[test]
    fn weights_follow_confidence() {
        // ELA anomaly 1 at full confidence, metadata clean at full confidence:
        // raw = 100 × (1 − 0.38 / 0.67) = 43.28; E = 0.67, no shrink
        assert_eq!(fuse_default((1.0, 1.0), (0.0, 1.0), (0.0, 0.0)), 43);
    }

    #[test]
    fn low_evidence_shrinks_toward_neutral() {
        let thin = fuse_default((0.0, 0.1), (0.0, 0.1), (0.0, 0.1));
        let full = fuse_default((0.0, 1.0), (0.0, 1.0), (0.0, 1.0));
        assert!(thin > 50 && thin < full, "thin {thin}, full {full}");
    }

    // =========================================================================
    // Ordering and structure
    // =========================================================================

    #[test]
    fn signals_are_reordered() {
        let result = fuse(
            &[
                signal(SignalKind::Shadow, 0.1, 0.5),
                signal(SignalKind::Ela, 0.2, 0.5),
                signal(SignalKind::Metadata, 0.3, 0.5),
            ],
            &FusionConfig::default(),
        );
        let kinds: Vec<SignalKind> = result.signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SignalKind::ALL.to_vec());
        assert_eq!(result.signal(SignalKind::Ela).unwrap().anomaly_score, 0.2);
    }

    #[test]
    fn input_order_does_not_change_score() {
        let a = [
            signal(SignalKind::Ela, 0.4, 0.8),
            signal(SignalKind::Metadata, 0.9, 0.6),
            signal(SignalKind::Shadow, 0.1, 0.3),
        ];
        let mut b = a.clone();
        b.reverse();
        let config = FusionConfig::default();
        assert_eq!(fuse(&a, &config), fuse(&b, &config));
    }

    #[test]
    fn missing_kind_counts_as_no_evidence() {
        let config = FusionConfig::default();
        let partial = fuse(&[signal(SignalKind::Ela, 0.5, 1.0)], &config);
        let explicit = fuse(
            &[
                signal(SignalKind::Ela, 0.5, 1.0),
                signal(SignalKind::Metadata, 0.0, 0.0),
                signal(SignalKind::Shadow, 0.0, 0.0),
            ],
            &config,
        );
        assert_eq!(partial, explicit);
    }

    // =========================================================================
    // Monotonicity
    // =========================================================================

    #[test]
    fn raising_any_anomaly_never_raises_trust() {
        let base = [(0.2, 0.7), (0.3, 0.5), (0.1, 0.9)];
        for idx in 0..3 {
            let mut previous = u8::MAX;
            for step in 0..=10 {
                let mut s = base;
                s[idx].0 = step as f64 / 10.0;
                let score = fuse_default(s[0], s[1], s[2]);
                assert!(score <= previous, "kind {idx} step {step}: {score} > {previous}");
                previous = score;
            }
        }
    }

    #[test]
    fn zero_confidence_signal_cannot_move_score() {
        let low = fuse_default((0.2, 0.8), (0.0, 0.0), (0.1, 0.6));
        let high = fuse_default((0.2, 0.8), (1.0, 0.0), (0.1, 0.6));
        assert_eq!(low, high);
    }

    #[test]
    fn weight_lookup() {
        let config = FusionConfig::default();
        assert_eq!(weight(&config, SignalKind::Ela), 0.38);
        assert_eq!(weight(&config, SignalKind::Shadow), 0.33);
        assert_eq!(weight(&config, SignalKind::Metadata), 0.29);
    }
}
