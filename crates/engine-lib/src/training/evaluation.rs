//! Binary classification metrics on a held-out split

use crate::models::PredictionResult;

/// Quality measures for one evaluation run, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub positive_precision: f64,
    pub positive_recall: f64,
    pub f1_score: f64,
    pub auc: f64,
}

/// Compare predictions against the true labels.
///
/// Precision, recall and F1 are 0 when their denominator is empty; AUC is
/// 0.5 when only one class is present.
pub fn evaluate(actual: &[bool], predicted: &[PredictionResult]) -> Evaluation {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return Evaluation {
            accuracy: 0.0,
            positive_precision: 0.0,
            positive_recall: 0.0,
            f1_score: 0.0,
            auc: 0.5,
        };
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (&truth, prediction) in actual.iter().zip(predicted) {
        match (truth, prediction.label) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    let accuracy = (tp + tn) as f64 / n as f64;
    let positive_precision = ratio(tp, tp + fp);
    let positive_recall = ratio(tp, tp + fn_);
    let f1_score = if positive_precision + positive_recall > 0.0 {
        2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
    } else {
        0.0
    };

    let probabilities: Vec<f64> = predicted[..n].iter().map(|p| p.probability).collect();

    Evaluation {
        accuracy,
        positive_precision,
        positive_recall,
        f1_score,
        auc: area_under_roc(&actual[..n], &probabilities),
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// ROC AUC via the Mann-Whitney rank statistic, averaging ranks over ties
pub fn area_under_roc(actual: &[bool], scores: &[f64]) -> f64 {
    let positives = actual.iter().filter(|&&l| l).count();
    let negatives = actual.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..actual.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; tied block [start, end) shares the mean rank
        let mean_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end].iter().filter(|&&i| actual[i]).count();
        positive_rank_sum += mean_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}
