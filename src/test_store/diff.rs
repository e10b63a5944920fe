use std::fmt::Debug;

use similar::TextDiff;

/// Line diff of the pretty `Debug` renderings of two values.
pub(crate) fn debug_diff<T: Debug + ?Sized>(expected: &T, actual: &T) -> String {
    text_diff(&format!("{expected:#?}"), &format!("{actual:#?}"))
}

pub(crate) fn text_diff(expected: &str, actual: &str) -> String {
    TextDiff::from_lines(expected, actual)
        .unified_diff()
        .context_radius(2)
        .header("expected", "actual")
        .to_string()
}
