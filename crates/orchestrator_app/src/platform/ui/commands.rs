use std::path::PathBuf;

pub const HELP: &[&str] = &[
    "Type a question and press Enter to send it to the orchestrator.",
    "  :domains               list domains",
    "  :domain <key>          switch domain (hr, finance, procurement)",
    "  :recommend <n>         put recommended question n into the input",
    "  :send                  send the current input",
    "  :upload <path>         upload a document (.pdf, .doc, .docx, .txt, .md)",
    "  :download              download the most recently offered form",
    "  :edit <key> <value>    change a field in the confirmation dialog",
    "  :submit | :cancel      submit or discard the confirmation dialog",
    "  :dismiss               close the error dialog",
    "  :help                  show this help",
    "  :quit                  exit",
];

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text: becomes the task input and is sent.
    Ask(String),
    Send,
    ListDomains,
    Domain(String),
    Recommend(usize),
    Upload(PathBuf),
    Download,
    Edit { key: String, value: String },
    Submit,
    Cancel,
    Dismiss,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Ok(Command::Ask(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "send" => Ok(Command::Send),
        "domains" => Ok(Command::ListDomains),
        "domain" if !args.is_empty() => Ok(Command::Domain(args.to_string())),
        "domain" => Err("usage: :domain <key>".to_string()),
        "recommend" | "r" => args
            .parse::<usize>()
            .ok()
            .filter(|index| *index > 0)
            .map(Command::Recommend)
            .ok_or_else(|| "usage: :recommend <n> (n starts at 1)".to_string()),
        "upload" if !args.is_empty() => Ok(Command::Upload(PathBuf::from(args))),
        "upload" => Err("usage: :upload <path>".to_string()),
        "download" => Ok(Command::Download),
        "edit" => match args.split_once(char::is_whitespace) {
            Some((key, value)) => Ok(Command::Edit {
                key: key.to_string(),
                value: value.trim().to_string(),
            }),
            None if !args.is_empty() => Ok(Command::Edit {
                key: args.to_string(),
                value: String::new(),
            }),
            None => Err("usage: :edit <key> <value>".to_string()),
        },
        "submit" => Ok(Command::Submit),
        "cancel" => Ok(Command::Cancel),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command :{other} (try :help)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_command("I want to apply for leave\n"),
            Ok(Command::Ask("I want to apply for leave".into()))
        );
        assert_eq!(parse_command("   "), Ok(Command::Ask("   ".into())));
    }

    #[test]
    fn commands_take_arguments() {
        assert_eq!(parse_command(":domain finance"), Ok(Command::Domain("finance".into())));
        assert_eq!(parse_command(":recommend 2"), Ok(Command::Recommend(2)));
        assert_eq!(
            parse_command(":upload ./my forms/leave.pdf"),
            Ok(Command::Upload(PathBuf::from("./my forms/leave.pdf")))
        );
        assert_eq!(
            parse_command(":edit employee_name Bob Smith"),
            Ok(Command::Edit {
                key: "employee_name".into(),
                value: "Bob Smith".into()
            })
        );
        assert_eq!(
            parse_command(":edit reason"),
            Ok(Command::Edit {
                key: "reason".into(),
                value: String::new()
            })
        );
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse_command(":recommend 0").is_err());
        assert!(parse_command(":recommend two").is_err());
        assert!(parse_command(":domain").is_err());
        assert!(parse_command(":edit").is_err());
        assert!(parse_command(":frobnicate").is_err());
    }
}
