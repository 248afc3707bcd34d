//! Terminal output utilities: ANSI notes and the review tables printed by
//! `govsync analyze`.

use govsync_core::AnalysisResult;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Wrap `text` in `style` when the terminal can show it.
fn paint(text: &str, style: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Render a two-column field/value table. Labels are padded before styling.
pub fn render_fields(rows: &[(&str, String)]) -> String {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let pad = label_width.saturating_sub(label.chars().count());
        let label = paint(label, DIM);
        out.push_str(&format!("  {label}{}  {value}\n", " ".repeat(pad)));
    }
    out
}

/// The review screen as plain text.
pub fn render_review(short_id: &str, result: &AnalysisResult) -> String {
    let license = &result.license_data;
    let eq = &result.equivalency;

    let confidence = format!("{:.0}%", license.authenticity_confidence * 100.0);
    let authenticity = if license.is_authentic {
        paint(&format!("Authentic ({confidence})"), GREEN)
    } else {
        paint(&format!("Suspect ({confidence})"), RED)
    };
    let exchange = if eq.is_direct_exchange {
        paint("Direct exchange", GREEN)
    } else {
        paint("Testing required", YELLOW)
    };

    let mut out = format!("{}\n\n", paint(&format!("Session #{short_id}: review"), BOLD));

    out.push_str(&paint("Extracted Data\n", BOLD));
    out.push_str(&render_fields(&[
        ("Name", license.full_name()),
        ("Date of birth", license.dob.clone()),
        ("Address", license.address.clone()),
        ("License #", license.license_number.clone()),
        ("Issued by", license.origin_province.clone()),
        ("Class", license.current_class.clone()),
        ("Expires", license.expiry_date.clone()),
        ("Conditions", join_or_none(&license.conditions)),
        ("Restrictions", join_or_none(&license.restrictions)),
        ("Authenticity", authenticity),
    ]));

    out.push('\n');
    out.push_str(&paint("Equivalency\n", BOLD));
    let mut eq_rows = vec![
        ("Target class", eq.target_class.clone()),
        ("Exchange", exchange),
        ("Tests", join_or_none(&eq.required_tests)),
        ("Documents", join_or_none(&eq.required_docs)),
        ("Fees", format!("${:.2}", eq.fees)),
        ("Policy", eq.policy_citation.clone()),
    ];
    if !eq.notes.is_empty() {
        eq_rows.push(("Notes", eq.notes.clone()));
    }
    out.push_str(&render_fields(&eq_rows));
    out
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govsync_understanding::sample_result;

    fn strip_ansi(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until 'm'
                for next in chars.by_ref() {
                    if next == 'm' { break; }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    #[test]
    fn aligns_field_values() {
        let out = strip_ansi(&render_fields(&[
            ("Name", "Alex".to_string()),
            ("Date of birth", "1990-05-14".to_string()),
        ]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].find("Alex"), lines[1].find("1990-05-14"));
    }

    #[test]
    fn review_lists_both_sections() {
        let result = sample_result();
        let out = strip_ansi(&render_review("abcd1234", &result));
        assert!(out.contains("Session #abcd1234"));
        assert!(out.contains("Extracted Data"));
        assert!(out.contains("Equivalency"));
        assert!(out.contains("$90.00"));
        assert!(out.contains("Direct exchange"));
        assert!(out.contains("Restrictions"));
        assert!(out.contains("None"));
    }
}
