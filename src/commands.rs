//! Command-bar commands and their autocomplete.

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// Commands accepted after `:`.
///
/// Equal ranks keep table order, so `job` comes first: a prefix shared
/// with `jobs` resolves to the command that takes an argument.
pub const COMMANDS: &[Command] = &[
  Command {
    name: "job",
    aliases: &["o", "open"],
    description: "Open a job by id (job <id>)",
  },
  Command {
    name: "jobs",
    aliases: &["l", "list", "home"],
    description: "Browse job listings",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit jobdeck",
  },
];

impl Command {
  /// How well `word` names this command; lower is better, `None` is no match
  fn rank(&self, word: &str) -> Option<u8> {
    let aliases = self.aliases.iter();
    if self.name == word {
      Some(0)
    } else if self.aliases.contains(&word) {
      Some(1)
    } else if self.name.starts_with(word) {
      Some(2)
    } else if aliases.clone().any(|a| a.starts_with(word)) {
      Some(3)
    } else if self.name.contains(word) {
      Some(4)
    } else if aliases.clone().any(|a| a.contains(word)) {
      Some(5)
    } else {
      None
    }
  }
}

/// Commands matching the first word of `input`, best match first.
///
/// Arguments after the first word do not affect matching. Empty input
/// lists every command.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let word = input
    .split_whitespace()
    .next()
    .unwrap_or("")
    .to_lowercase();

  if word.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| cmd.rank(&word).map(|rank| (rank, cmd)))
    .collect();

  // Stable, so equal ranks keep table order
  ranked.sort_by_key(|(rank, _)| *rank);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

/// Split command input into its first word and the remaining arguments.
pub fn split_args(input: &str) -> (&str, &str) {
  let input = input.trim();
  match input.split_once(char::is_whitespace) {
    Some((name, rest)) => (name, rest.trim()),
    None => (input, ""),
  }
}
