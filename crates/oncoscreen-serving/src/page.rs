//! Server-side rendering of the screening form.
//!
//! The page is a single HTML document with two forms: the bulk
//! comma-separated input posting to `/predict` and the detailed per-feature
//! inputs posting to `/predict/detailed`. Each form has its own result slot.
//! All text derived from a submission is escaped before it is written.

use crate::error::ScreeningError;
use crate::features::{display_label, FEATURE_COUNT, FEATURE_NAMES, SAMPLE_BULK_INPUT, SAMPLE_DETAILED_INPUT};
use crate::input::field_name;
use crate::verdict::Verdict;
use std::fmt::Write as _;

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// One comma-separated text field
    Bulk,
    /// One field per feature
    Detailed,
}

/// What to show beneath a form after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    /// A styled verdict
    Verdict(Verdict),
    /// An inline error message
    Error(String),
}

impl Panel {
    /// Turn a screening result into a panel, choosing the error copy for `mode`.
    pub fn from_result(result: Result<Verdict, ScreeningError>, mode: InputMode) -> Self {
        match result {
            Ok(verdict) => Panel::Verdict(verdict),
            Err(err) => Panel::Error(error_message(&err, mode)),
        }
    }
}

/// User-facing copy for an error.
pub fn error_message(err: &ScreeningError, mode: InputMode) -> String {
    match (err, mode) {
        (ScreeningError::InvalidFeatureCount { .. }, InputMode::Bulk) => {
            format!("Please enter exactly {FEATURE_COUNT} comma-separated values.")
        }
        (ScreeningError::InvalidFeatureCount { .. }, InputMode::Detailed) => {
            format!("All {FEATURE_COUNT} features must be entered.")
        }
        (err, _) => format!("Error: {err}"),
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything needed to render the page once.
#[derive(Debug, Clone)]
pub struct PageState {
    /// Current contents of the bulk text field
    pub bulk_input: String,
    /// Current contents of the detailed fields, in feature order
    pub detailed_inputs: Vec<String>,
    /// Result of the last bulk submission
    pub bulk_panel: Option<Panel>,
    /// Result of the last detailed submission
    pub detailed_panel: Option<Panel>,
    /// Whether `/image` serves a display image
    pub has_image: bool,
}

impl PageState {
    /// The page as first shown, prefilled with sample values.
    pub fn initial(has_image: bool) -> Self {
        Self {
            bulk_input: SAMPLE_BULK_INPUT.to_string(),
            detailed_inputs: SAMPLE_DETAILED_INPUT
                .iter()
                .map(|v| format!("{v:.5}"))
                .collect(),
            bulk_panel: None,
            detailed_panel: None,
            has_image,
        }
    }

    /// Render the full HTML document.
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(16 * 1024);
        html.push_str(HEAD);

        if self.has_image {
            html.push_str(r#"<img class="banner" src="/image" alt="Breast cancer awareness">"#);
        }
        html.push_str(r#"<p class="big-font">Breast Cancer Detection System</p>"#);
        html.push_str(
            r#"<p class="emotion">&ldquo;Early detection saves lives, let us stand together in strength and hope.&rdquo; &#127895;</p>"#,
        );

        // Bulk form
        let _ = write!(
            html,
            r#"<form method="post" action="/predict">
<p class="input-label">Please enter {FEATURE_COUNT} comma-separated medical features below:</p>
<input type="text" name="features" value="{}">
<button type="submit" class="primary">Predict</button>
</form>"#,
            escape_html(&self.bulk_input)
        );
        if let Some(panel) = &self.bulk_panel {
            html.push_str(&render_panel(panel));
        }

        // Detailed form
        html.push_str(
            r#"<hr class="section"><h4>&#128300; Detailed Analysis: Enter each feature separately</h4>
<form method="post" action="/predict/detailed"><div class="grid">"#,
        );
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let value = self.detailed_inputs.get(i).map(String::as_str).unwrap_or("");
            let field = field_name(i);
            let _ = write!(
                html,
                r#"<div class="field"><label for="{field}">{}</label><input type="number" step="any" id="{field}" name="{field}" value="{}"></div>"#,
                escape_html(&display_label(name)),
                escape_html(value)
            );
        }
        html.push_str(
            r#"</div><button type="submit" class="secondary">Predict (Detailed)</button></form>"#,
        );
        if let Some(panel) = &self.detailed_panel {
            html.push_str(&render_panel(panel));
        }

        html.push_str(FOOTER);
        html
    }
}

/// Render one result or error panel.
pub fn render_panel(panel: &Panel) -> String {
    match panel {
        Panel::Verdict(v) if v.is_benign() => format!(
            r#"<div class="result benign"><h2>Don't worry Tumor is Benign</h2><p class="confidence">Confidence: {}</p><p>You&rsquo;re doing great! Keep taking care of your health &#127800;</p></div>"#,
            v.confidence_display()
        ),
        Panel::Verdict(v) => format!(
            r#"<div class="result malignant"><h2>&#9888;&#65039; Malignant Tumor Detected</h2><p class="confidence">Confidence: {}</p><p>You are not alone sending you strength to fight this. Talk to a doctor immediately &#128151;</p><div class="hug">&#129730;</div></div>"#,
            v.confidence_display()
        ),
        Panel::Error(msg) => format!(r#"<div class="error">{}</div>"#, escape_html(msg)),
    }
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Breast Cancer Detection</title>
<style>
body { background: linear-gradient(to bottom right, #ffccdd, #ffe6f0); color: #880e4f; font-family: sans-serif; max-width: 760px; margin: 0 auto; padding: 1em; }
.banner { width: 100%; }
.big-font { font-size: 30px; color: #ad1457; font-weight: bold; }
.emotion { font-size: 18px; color: #d81b60; font-style: italic; padding-bottom: 20px; }
.input-label { font-size: 18px; font-weight: bold; }
input[type="text"] { width: 100%; background-color: #fff0f5; color: #880e4f; font-weight: bold; }
input[type="number"] { width: 100%; color: #c2185b; font-weight: bold; }
button { background-color: #ec407a; color: white; font-weight: bold; border: 0; border-radius: 8px; padding: 0.4em 1em; margin-top: 0.5em; }
button.secondary { background-color: #f48fb1; }
.grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 0.5em; }
.field label { display: block; color: #6a1b9a; font-weight: bold; font-size: 16px; }
hr.section { margin-top: 50px; margin-bottom: 30px; }
.result { padding: 20px; border-radius: 10px; text-align: center; margin-top: 1em; }
.result.benign { background-color: #f8bbd0; }
.result.benign h2 { color: #4caf50; }
.result.malignant { background-color: #fce4ec; }
.result.malignant h2 { color: #c2185b; }
.confidence { font-size: 20px; font-weight: bold; }
.hug { font-size: 50px; }
.error { background-color: #ffebee; color: #c62828; padding: 1em; border-radius: 8px; margin-top: 1em; }
footer { text-align: center; font-size: 14px; padding-top: 10px; border-top: 1px solid #e91e63; margin-top: 2em; }
</style>
</head>
<body>
"#;

const FOOTER: &str = r#"
<footer>&copy; All rights reserved by <strong>Dania 2025</strong></footer>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ClassDistribution;

    fn verdict(probs: Vec<f64>) -> Verdict {
        Verdict::from_distribution(&ClassDistribution::new(probs).unwrap())
    }

    #[test]
    fn test_benign_panel() {
        let html = render_panel(&Panel::Verdict(verdict(vec![0.02, 0.98])));
        assert!(html.contains("Tumor is Benign"));
        assert!(html.contains("Confidence: 98.00%"));
        assert!(!html.contains("Malignant"));
    }

    #[test]
    fn test_malignant_panel() {
        let html = render_panel(&Panel::Verdict(verdict(vec![0.87, 0.13])));
        assert!(html.contains("Malignant Tumor Detected"));
        assert!(html.contains("Confidence: 87.00%"));
    }

    #[test]
    fn test_error_copy_per_mode() {
        let err = ScreeningError::InvalidFeatureCount {
            expected: 30,
            actual: 3,
        };
        assert_eq!(
            error_message(&err, InputMode::Bulk),
            "Please enter exactly 30 comma-separated values."
        );
        assert_eq!(
            error_message(&err, InputMode::Detailed),
            "All 30 features must be entered."
        );

        let err = ScreeningError::inference("bad model");
        assert_eq!(
            error_message(&err, InputMode::Bulk),
            "Error: Inference failed: bad model"
        );
    }

    #[test]
    fn test_non_numeric_message_carries_reason() {
        let reason = "abc".parse::<f64>().unwrap_err().to_string();
        let err = ScreeningError::NonNumericToken {
            position: 1,
            token: "abc".to_string(),
            reason: reason.clone(),
        };
        let msg = error_message(&err, InputMode::Bulk);
        assert!(msg.starts_with("Error: "));
        assert!(msg.contains(&reason));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_error_panel_is_escaped() {
        let html = render_panel(&Panel::Error("Error: <b>".to_string()));
        assert!(html.contains("Error: &lt;b&gt;"));
    }

    #[test]
    fn test_initial_page() {
        let html = PageState::initial(false).render();
        assert!(html.contains("Breast Cancer Detection System"));
        assert!(html.contains(&format!(r#"value="{SAMPLE_BULK_INPUT}""#)));
        assert!(html.contains(r#"name="feature_0" value="22.27000""#));
        assert!(html.contains(r#"name="feature_29" value="0.09789""#));
        assert!(html.contains("Mean radius"));
        assert!(html.contains("Worst fractal dimension"));
        assert!(html.contains("Predict (Detailed)"));
        assert!(!html.contains(r#"src="/image""#));
        assert!(!html.contains(r#"class="result"#));
    }

    #[test]
    fn test_page_with_image_and_panels() {
        let mut state = PageState::initial(true);
        state.bulk_input = "1,2,3".to_string();
        state.bulk_panel = Some(Panel::from_result(
            Err(ScreeningError::InvalidFeatureCount {
                expected: 30,
                actual: 3,
            }),
            InputMode::Bulk,
        ));
        state.detailed_panel = Some(Panel::Verdict(verdict(vec![0.87, 0.13])));

        let html = state.render();
        assert!(html.contains(r#"src="/image""#));
        assert!(html.contains(r#"value="1,2,3""#));
        assert!(html.contains("Please enter exactly 30 comma-separated values."));
        assert!(html.contains("Malignant Tumor Detected"));
    }

    #[test]
    fn test_submitted_input_is_escaped() {
        let mut state = PageState::initial(false);
        state.bulk_input = r#""><script>"#.to_string();
        let html = state.render();
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(!html.contains(r#""><script>"#));
    }
}
