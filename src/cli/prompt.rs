use std::io::{BufRead, BufReader, Stdin, Stdout, Write};

/// Line based terminal prompts.
///
/// Invalid answers are re-asked and never turned into errors. End of input
/// counts as cancelling.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<BufReader<Stdin>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one trimmed line, `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{}", prompt);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    /// Asks for a number in `0..=max` until one is given.
    ///
    /// Returns the 1-based choice, or `None` when the user picks `0` or input ends.
    pub fn choose(&mut self, prompt: &str, max: usize) -> Option<usize> {
        loop {
            let answer = self.ask(&format!("{} [0 - {}] : ", prompt, max))?;
            match answer.parse::<usize>() {
                Ok(0) => return None,
                Ok(n) if n <= max => return Some(n),
                Ok(_) => {
                    let _ = writeln!(self.output, "Invalid choice, pick a number up to {}", max);
                }
                Err(_) => continue,
            }
        }
    }

    /// Yes/no question; an empty answer takes `default_yes`.
    pub fn confirm(&mut self, prompt: &str, default_yes: bool) -> bool {
        match self.ask(prompt) {
            None => false,
            Some(answer) => match answer.to_lowercase().as_str() {
                "" => default_yes,
                "y" | "yes" => true,
                _ => false,
            },
        }
    }

    pub fn say(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }
}
