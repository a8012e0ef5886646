/// Scripted rebukes, mildest first
const VERDICTS: [&str; 5] = [
    "Agreeable. Perhaps your taste is not beyond saving.",
    "A questionable call, but everyone slips once.",
    "Your taste is beginning to concern the management.",
    "This rating borders on cinematic malpractice.",
    "Irreconcilable. The reference viewer has disowned your taste entirely.",
];

/// Picks a rebuke based on how far an effective score strays from the
/// reference user's effective score. Returns nothing when either side
/// is unknown.
///
/// The absolute difference is rounded to the nearest integer and clamped
/// into the verdict table, so gaps wider than four steps still select
/// the harshest verdict instead of indexing out of range. A difference
/// of zero selects the mildest verdict.
pub fn judge(effective: Option<f64>, reference: Option<f64>) -> Option<&'static str> {
    let difference = (effective? - reference?).abs().round() as usize;
    Some(VERDICTS[difference.min(VERDICTS.len() - 1)])
}
