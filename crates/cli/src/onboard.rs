// First-run questions for `harada onboard`.

use std::io::{self, BufRead, Write};

pub const QUESTIONS: [&str; 2] = [
    "Are you already familiar with the Harada Method?",
    "Do you know what large goal you want to achieve?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

fn parse_answer(line: &str) -> Option<Answer> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        _ => None,
    }
}

/// Ask every question in order, repeating a question until it gets a
/// yes or no. Returns `None` if input ends before the last answer.
pub fn ask_questions<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Vec<Answer>>> {
    let mut answers = Vec::with_capacity(QUESTIONS.len());
    let mut line = String::new();

    for (i, question) in QUESTIONS.iter().enumerate() {
        loop {
            write!(out, "[{}/{}] {} [y/n] ", i + 1, QUESTIONS.len(), question)?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(None);
            }
            match parse_answer(&line) {
                Some(answer) => {
                    answers.push(answer);
                    break;
                }
                None => writeln!(out, "Please answer yes or no.")?,
            }
        }
    }
    Ok(Some(answers))
}

/// Follow-up tips for the given answers.
pub fn tips(answers: &[Answer]) -> Vec<&'static str> {
    let mut tips = Vec::new();
    if answers.first() == Some(&Answer::No) {
        tips.push(
            "The board breaks one large goal (the centre block) into eight goal \
attributes, each surrounded by the concrete requirements that build it.",
        );
    }
    if answers.get(1) == Some(&Answer::No) {
        tips.push("Not sure of your goal yet? Try: harada assist goal \"help me phrase a goal\"");
    }
    tips.push("Run `harada show` to see your board.");
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_answered() {
        let mut input = "yes\nN\n".as_bytes();
        let mut out = Vec::new();
        let answers = ask_questions(&mut input, &mut out).unwrap();
        assert_eq!(answers, Some(vec![Answer::Yes, Answer::No]));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(QUESTIONS[0]));
        assert!(text.contains(QUESTIONS[1]));
    }

    #[test]
    fn test_reasks_on_bad_answer() {
        let mut input = "maybe\ny\ny\n".as_bytes();
        let mut out = Vec::new();
        let answers = ask_questions(&mut input, &mut out).unwrap();
        assert_eq!(answers, Some(vec![Answer::Yes, Answer::Yes]));
        assert!(String::from_utf8(out).unwrap().contains("Please answer yes or no."));
    }

    #[test]
    fn test_input_ends_early() {
        let mut input = "y\n".as_bytes();
        let mut out = Vec::new();
        assert_eq!(ask_questions(&mut input, &mut out).unwrap(), None);
    }

    #[test]
    fn test_tips_follow_answers() {
        assert_eq!(tips(&[Answer::Yes, Answer::Yes]).len(), 1);
        assert_eq!(tips(&[Answer::No, Answer::No]).len(), 3);
    }
}
