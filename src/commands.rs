/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home"],
    description: "Overview of users and products",
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Browse users",
  },
  Command {
    name: "products",
    aliases: &["p", "product"],
    description: "Browse products",
  },
  Command {
    name: "login",
    aliases: &["signin"],
    description: "Sign in with another account",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out and forget the session",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit dummydash",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_priority(cmd, &input_lower).map(|p| (cmd, p)))
    .collect();

  // Stable sort keeps declaration order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is a better match
fn match_priority(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("products");
    assert_eq!(suggestions[0].name, "products");
  }

  #[test]
  fn test_alias_beats_prefix() {
    // "p" is an alias of products and a prefix of nothing else
    let suggestions = get_suggestions("p");
    assert_eq!(suggestions[0].name, "products");

    // "u" is an alias of users, although "quit" contains it
    let suggestions = get_suggestions("u");
    assert_eq!(suggestions[0].name, "users");
  }

  #[test]
  fn test_prefix_match_keeps_order() {
    let names: Vec<&str> = get_suggestions("log").iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["login", "logout"]);
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("board");
    assert_eq!(suggestions[0].name, "dashboard");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
