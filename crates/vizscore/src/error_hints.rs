use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("input path does not exist")
        || haystack.contains("no such file or directory")
    {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Use an absolute path to avoid working-directory confusion.",
        );
    }

    if haystack.contains("unsupported format") {
        push_hint(
            &mut out,
            "Only .twb (XML) and .twbx (zip package) workbooks are supported.",
        );
        push_hint(
            &mut out,
            "If the file was exported by another tool, re-save it from Tableau first.",
        );
    }

    if haystack.contains("no .twb workbook entry") {
        push_hint(
            &mut out,
            "The package has no embedded workbook; it may be a data extract (.hyper) archive.",
        );
    }

    if haystack.contains("failed to parse config") {
        push_hint(
            &mut out,
            "The config file must be JSON, e.g. {\"weights\": {\"calcs\": 2.0}}.",
        );
        push_hint(
            &mut out,
            "All keys are optional; unspecified keys keep their defaults.",
        );
    }

    out
}

fn push_hint(out: &mut Vec<String>, hint: &str) {
    let hint = hint.to_string();
    if !out.contains(&hint) {
        out.push(hint);
    }
}
