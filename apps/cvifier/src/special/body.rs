use crate::errors::{CvError, Result};
use crate::markup::Writer;

const HTML_BODY_OPEN: &str = "<body";
const HTML_BODY_CLOSE: &str = "</body>";
const LATEX_BODY_OPEN: &str = "\\begin{document}";
const LATEX_BODY_CLOSE: &str = "\\end{document}";

/// Strips a rendered document down to its body: the inside of `<body ...>` for
/// HTML and of the `document` environment for LaTeX. Other writers' output is
/// returned as-is.
///
/// The HTML body keeps its `<div class="document">` wrapper; the `onlydiv`
/// rewrite rule strips it when asked to.
pub fn extract_body(rendered: &str, writer: &Writer) -> Result<String> {
    match writer {
        Writer::Html => {
            let tag_start = find_from(rendered, HTML_BODY_OPEN, 0)?;
            let open_end = rendered[tag_start..]
                .find('>')
                .map(|offset| tag_start + offset + 1)
                .ok_or_else(|| not_found(HTML_BODY_OPEN))?;
            let close = find_from(rendered, HTML_BODY_CLOSE, open_end)?;
            Ok(rendered[open_end..close].to_string())
        }
        Writer::Latex => {
            let open = find_from(rendered, LATEX_BODY_OPEN, 0)?;
            let open_end = open + LATEX_BODY_OPEN.len();
            let close = find_from(rendered, LATEX_BODY_CLOSE, open_end)?;
            Ok(rendered[open_end..close].to_string())
        }
        Writer::Other(_) => Ok(rendered.to_string()),
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Result<usize> {
    haystack[from..]
        .find(needle)
        .map(|offset| from + offset)
        .ok_or_else(|| not_found(needle))
}

fn not_found(delimiter: &str) -> CvError {
    CvError::DelimiterNotFound {
        delimiter: delimiter.to_string(),
    }
}
