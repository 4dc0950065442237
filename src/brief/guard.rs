/// Fixed closing line of every brief
pub const LIMITATION_LINE: &str = "Behavioral signal, not clinical correctness.";

const BULLET: char = '•';

const FILLER_BULLETS: [&str; 3] = [
    "• Review top service code share and entropy changes (first vs last period).",
    "• Validate whether changes align with documented operational or case-mix shifts.",
    "• If unexplained, run a light-touch sample review and document findings.",
];

/// Terms that signal details invented beyond the supplied facts
pub const BANNED_TERMS: &[&str] = &[
    "mri",
    "ct",
    "lower back",
    "icd",
    "cpt",
    "radiation",
    "referral",
    "guideline",
    "peer average",
    "specialist",
    "clinic",
    "pain",
    "q1",
    "q2",
    "q3",
    "q4",
];

/// Strip markdown emphasis, normalize list markers to "•" and line endings
pub fn strip_markdown(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\0', "").replace("**", "");

    normalized
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some('-' | '*'), Some(c)) if c.is_whitespace() => {
                    format!("{BULLET} {}", chars.as_str().trim_start())
                }
                _ => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_bullet(line: &str) -> bool {
    line.trim_start().starts_with(BULLET)
}

/// Keep at most three bullets, padding with fixed fillers up to three
///
/// Body lines keep their order and are placed before the bullets.
pub fn ensure_three_bullets(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let mut bullets: Vec<String> = lines
        .iter()
        .filter(|l| is_bullet(l))
        .take(3)
        .map(|l| l.to_string())
        .collect();
    let body = lines
        .iter()
        .filter(|l| !is_bullet(l))
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    while bullets.len() < 3 {
        bullets.push(FILLER_BULLETS[bullets.len()].to_string());
    }

    std::iter::once(body.trim().to_string())
        .chain(bullets)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Make the limitation line the single final line
pub fn ensure_limitation_at_end(text: &str) -> String {
    let mut cleaned = text.trim_end();

    let cut = cleaned.len().checked_sub(LIMITATION_LINE.len());
    if let Some(start) = cut {
        if cleaned
            .get(start..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(LIMITATION_LINE))
        {
            cleaned = &cleaned[..start];
        }
    }

    format!("{}\n{LIMITATION_LINE}", cleaned.trim())
}

/// Words that start with a banned term but carry no invented detail
const ALLOWED_WORDS: &[&str] = &["clinical", "clinically"];

/// Lowercase alphanumeric tokens, also split where a digit run meets a
/// letter ("2023q3" becomes "2023", "q3")
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_digit = false;

    for c in text.to_lowercase().chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_digit = false;
            continue;
        }
        if prev_digit && c.is_alphabetic() && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_digit = c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// True if the text mentions any banned term
///
/// A single-word term matches any token starting with it ("referrals",
/// "painful") unless the token is in the allow-list. A phrase matches as
/// consecutive tokens, with the last one allowed to be inflected.
pub fn looks_hallucinated(text: &str) -> bool {
    let tokens = tokenize(text);
    let haystack = format!(" {}", tokens.join(" "));

    BANNED_TERMS.iter().any(|term| {
        if term.contains(' ') {
            haystack.contains(&format!(" {term}"))
        } else {
            tokens
                .iter()
                .any(|t| t.starts_with(term) && !ALLOWED_WORDS.contains(&t.as_str()))
        }
    })
}

/// Full post-processing pipeline for enricher output
pub fn finalize(text: &str) -> String {
    ensure_limitation_at_end(&ensure_three_bullets(&strip_markdown(text)))
}
