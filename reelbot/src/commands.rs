//! Slash commands layered ahead of free-text resolution.

/// A recognized slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    AddMovie {
        name: String,
        quality: String,
        raw_artifact: String,
    },
    Request {
        title: String,
    },
    ShowRequests,
}

/// Outcome of trying to read a leading-slash message as a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParse {
    Ok(Command),
    /// Recognized command, wrong arity; echo the usage line back.
    Usage(&'static str),
    /// Leading slash but no command we know; falls through as free text.
    Unknown,
}

pub const ADDMOVIE_USAGE: &str = "Usage: /addmovie <name> <quality> <link_or_handle>";
pub const REQUEST_USAGE: &str = "Usage: /request <movie name>";

/// Parse a message as a slash command. `None` means the text does not start
/// with `/` and should go straight to query resolution.
pub fn parse(text: &str) -> Option<CommandParse> {
    let rest = text.trim().strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let args: Vec<&str> = parts.collect();

    match name.as_str() {
        "start" => Some(CommandParse::Ok(Command::Start)),
        "addmovie" => {
            if args.len() < 3 {
                return Some(CommandParse::Usage(ADDMOVIE_USAGE));
            }
            Some(CommandParse::Ok(Command::AddMovie {
                name: args[0].to_lowercase(),
                quality: args[1].to_string(),
                raw_artifact: args[2].to_string(),
            }))
        }
        "request" => {
            if args.is_empty() {
                return Some(CommandParse::Usage(REQUEST_USAGE));
            }
            Some(CommandParse::Ok(Command::Request {
                title: args.join(" "),
            }))
        }
        "showrequests" => Some(CommandParse::Ok(Command::ShowRequests)),
        _ => Some(CommandParse::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_is_not_a_command() {
        assert_eq!(parse("inception"), None);
        assert_eq!(parse("  matrix reloaded "), None);
    }

    #[test]
    fn parses_start() {
        assert_eq!(parse("/start"), Some(CommandParse::Ok(Command::Start)));
    }

    #[test]
    fn addmovie_requires_three_args() {
        assert_eq!(
            parse("/addmovie inception 720p"),
            Some(CommandParse::Usage(ADDMOVIE_USAGE))
        );
        assert_eq!(
            parse("/addmovie Inception 720p https://x/1"),
            Some(CommandParse::Ok(Command::AddMovie {
                name: "inception".to_string(),
                quality: "720p".to_string(),
                raw_artifact: "https://x/1".to_string(),
            }))
        );
    }

    #[test]
    fn request_joins_a_multiword_title() {
        assert_eq!(
            parse("/request the matrix reloaded"),
            Some(CommandParse::Ok(Command::Request {
                title: "the matrix reloaded".to_string(),
            }))
        );
        assert_eq!(parse("/request"), Some(CommandParse::Usage(REQUEST_USAGE)));
    }

    #[test]
    fn unknown_commands_fall_through() {
        assert_eq!(parse("/frobnicate now"), Some(CommandParse::Unknown));
    }

    #[test]
    fn bare_slash_is_not_a_command() {
        assert_eq!(parse("/"), None);
    }
}
