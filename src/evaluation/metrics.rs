//! Métricas simples de comparação entre previsto e esperado.

use std::collections::HashSet;

/// Fração de posições em que previsto == esperado.
///
/// Tamanhos diferentes ou entradas vazias resultam em `0.0`.
///
/// ```
/// use inbox_assistant::evaluation::calculate_accuracy;
/// assert_eq!(calculate_accuracy(&["High", "Low"], &["High", "Medium"]), 0.5);
/// ```
pub fn calculate_accuracy<T: PartialEq>(predictions: &[T], expected: &[T]) -> f64 {
    if predictions.is_empty() || predictions.len() != expected.len() {
        return 0.0;
    }

    let correct = predictions
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();

    correct as f64 / predictions.len() as f64
}

/// Similaridade de Jaccard entre os tons, sem diferenciar maiúsculas.
///
/// Se qualquer lado estiver vazio, resulta em `0.0`.
pub fn calculate_tone_overlap<P, E>(predicted: &[P], expected: &[E]) -> f64
where
    P: AsRef<str>,
    E: AsRef<str>,
{
    if predicted.is_empty() || expected.is_empty() {
        return 0.0;
    }

    let predicted: HashSet<String> = predicted.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let expected: HashSet<String> = expected.iter().map(|t| t.as_ref().to_lowercase()).collect();

    let union = predicted.union(&expected).count();
    if union == 0 {
        return 0.0;
    }

    predicted.intersection(&expected).count() as f64 / union as f64
}
