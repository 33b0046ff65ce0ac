use std::str::FromStr;

/// The commands the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    AddAccount,
    CreateGroup,
    CreateBulk,
    ListAccounts,
    Status,
}

impl FromStr for BotCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" | "help" => Ok(BotCommand::Start),
            "addaccount" => Ok(BotCommand::AddAccount),
            "creategroup" => Ok(BotCommand::CreateGroup),
            "createbulk" => Ok(BotCommand::CreateBulk),
            "listaccounts" => Ok(BotCommand::ListAccounts),
            "status" => Ok(BotCommand::Status),
            _ => Err(()),
        }
    }
}

/// Split `/cmd@botname arg1 ...` into a lowercase command name and the rest.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_slash_bot_suffix_and_case() {
        assert_eq!(
            parse_command("/CreateBulk@group_bot"),
            ("createbulk".to_string(), String::new())
        );
        assert_eq!(
            parse_command("  /status   verbose please "),
            ("status".to_string(), "verbose please".to_string())
        );
    }

    #[test]
    fn known_names_map_to_commands() {
        assert_eq!("start".parse(), Ok(BotCommand::Start));
        assert_eq!("help".parse(), Ok(BotCommand::Start));
        assert_eq!("addaccount".parse(), Ok(BotCommand::AddAccount));
        assert_eq!("creategroup".parse(), Ok(BotCommand::CreateGroup));
        assert_eq!("createbulk".parse(), Ok(BotCommand::CreateBulk));
        assert_eq!("listaccounts".parse(), Ok(BotCommand::ListAccounts));
        assert_eq!("status".parse(), Ok(BotCommand::Status));
        assert_eq!("deleteaccount".parse::<BotCommand>(), Err(()));
    }
}
