//! 削除前の対話的な確認
//!
//! `[y/N]` で確認したあと、1桁同士の計算問題に正解したときだけ続行します。

use rand::Rng;
use std::fmt;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;
use tracing::warn;
use vdcflow_cloud::Confirm;

/// 不正な入力を聞き直す上限
const MAX_ATTEMPTS: usize = 3;

const WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Sub => write!(f, "-"),
            Operator::Mul => write!(f, "*"),
        }
    }
}

/// 確認用の計算問題
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    left: u8,
    right: u8,
    operator: Operator,
    /// 数字ではなく英単語で表示する
    left_as_word: bool,
    right_as_word: bool,
}

impl Challenge {
    pub fn new(left: u8, operator: Operator, right: u8) -> Self {
        Self {
            left: left % 10,
            right: right % 10,
            operator,
            left_as_word: false,
            right_as_word: false,
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::rngs::OsRng;
        let operator = [Operator::Mul, Operator::Sub, Operator::Add][rng.gen_range(0..3)];
        Self {
            left: rng.gen_range(0..=9),
            right: rng.gen_range(0..=9),
            operator,
            left_as_word: rng.gen_bool(0.5),
            right_as_word: rng.gen_bool(0.5),
        }
    }

    pub fn question(&self) -> String {
        let render = |n: u8, as_word: bool| {
            if as_word {
                WORDS[n as usize].to_string()
            } else {
                n.to_string()
            }
        };
        format!(
            "What is the result of {} {} {}? ",
            render(self.left, self.left_as_word),
            self.operator,
            render(self.right, self.right_as_word)
        )
    }

    pub fn answer(&self) -> i32 {
        let (left, right) = (i32::from(self.left), i32::from(self.right));
        match self.operator {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
        }
    }
}

/// 標準入出力（またはテスト用の任意の入出力）で確認する
pub struct InteractiveConfirm<R, W> {
    io: Mutex<(R, W)>,
    challenge: fn() -> Challenge,
}

impl InteractiveConfirm<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
            challenge: Challenge::random,
        }
    }

    #[cfg(test)]
    fn with_challenge(mut self, challenge: fn() -> Challenge) -> Self {
        self.challenge = challenge;
        self
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        match self.io.into_inner() {
            Ok((_, output)) => output,
            Err(poisoned) => poisoned.into_inner().1,
        }
    }

    fn ask(&self, prompt: &str) -> io::Result<bool> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| io::Error::other("confirmation lock poisoned"))?;
        let (input, output) = &mut *guard;

        for _ in 0..MAX_ATTEMPTS {
            write!(output, "{prompt} [y/N]: ")?;
            output.flush()?;
            let Some(answer) = read_answer(input)? else {
                return Ok(false);
            };

            match answer.to_ascii_lowercase().as_str() {
                "" | "n" | "no" => {
                    writeln!(output, "Ok, see you next time...")?;
                    return Ok(false);
                }
                "y" | "yes" => return solve(input, output, (self.challenge)()),
                "h" | "help" => writeln!(output, "There is no help. Try again.")?,
                other => writeln!(output, "{other} is not a valid answer!")?,
            }
        }

        writeln!(output, "Too many invalid answers.")?;
        Ok(false)
    }
}

impl<R, W> Confirm for InteractiveConfirm<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, prompt: &str) -> bool {
        self.ask(prompt).unwrap_or_else(|e| {
            warn!("Confirmation failed: {e}");
            false
        })
    }
}

fn solve<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    challenge: Challenge,
) -> io::Result<bool> {
    write!(output, "{}", challenge.question())?;
    output.flush()?;
    let answer = read_answer(input)?;

    if answer.and_then(|a| a.parse::<i32>().ok()) == Some(challenge.answer()) {
        Ok(true)
    } else {
        writeln!(output, "Wrong answer...")?;
        Ok(false)
    }
}

/// 1行読む（EOF なら None）
fn read_answer<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
