//! Line command protocol parser and executor.
//!
//! One request line per connection:
//! - `PING`
//! - `ECHO <text>`
//! - `SET <key> <value>`
//! - `GET <key>`
//! - `DEL <key>`
//!
//! Command words are case-insensitive. Replies are plain text with no line
//! terminator; the server closes the connection after writing one.

use crate::storage::Storage;
use std::str::FromStr;

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check
    Ping,

    /// Reply with the argument text
    Echo(Option<String>),

    /// Store the value after the key
    Set(Option<String>),

    /// Look up a key
    Get(Option<String>),

    /// Remove a key
    Del(Option<String>),
}

impl Command {
    /// Run the command against `storage` and produce the reply text.
    pub fn execute(&self, storage: &Storage) -> Result<String, CommandError> {
        match self {
            Command::Ping => Ok("PONG".to_string()),
            Command::Echo(args) => args.clone().ok_or(CommandError::NothingToEcho),
            Command::Set(args) => execute_set(args.as_deref(), storage),
            Command::Get(args) => {
                let key = key_arg(args.as_deref()).ok_or(CommandError::NoKey("GET"))?;
                storage.get(key).ok_or(CommandError::NotFound)
            }
            Command::Del(args) => {
                let key = key_arg(args.as_deref()).ok_or(CommandError::NoKey("DEL"))?;
                if storage.delete(key) {
                    Ok(format!("DEL \"{}\"", key))
                } else {
                    Err(CommandError::NotFound)
                }
            }
        }
    }
}

fn execute_set(args: Option<&str>, storage: &Storage) -> Result<String, CommandError> {
    let args = args.ok_or(CommandError::InvalidSetArguments)?;
    let mut tokens = args.splitn(2, ' ');

    // A leading space yields the empty key, which is stored like any other
    let key = tokens.next().unwrap_or_default();
    let value = tokens.next().ok_or(CommandError::NoValue)?;

    storage.set(key, value);
    Ok(format!("SET \"{}\":\"{}\"", key, value))
}

/// Trimmed key argument, `None` when missing or blank
fn key_arg(args: Option<&str>) -> Option<&str> {
    args.map(str::trim).filter(|k| !k.is_empty())
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut splitter = input.trim_end().splitn(2, ' ');
        let word = splitter.next().unwrap_or_default().to_uppercase();
        let args = splitter.next().map(str::to_string);

        match word.as_str() {
            "PING" => Ok(Command::Ping),
            "ECHO" => Ok(Command::Echo(args)),
            "SET" => Ok(Command::Set(args)),
            "GET" => Ok(Command::Get(args)),
            "DEL" => Ok(Command::Del(args)),
            _ => Err(CommandError::Unknown(word)),
        }
    }
}

/// Parse and execute a raw request line, mapping errors to their reply text.
pub fn respond(line: &str, storage: &Storage) -> String {
    line.parse::<Command>()
        .and_then(|command| command.execute(storage))
        .unwrap_or_else(|e| e.to_string())
}

/// Command failures. Each one is sent back to the client as its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    NothingToEcho,
    InvalidSetArguments,
    NoKey(&'static str),
    NoValue,
    NotFound,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Unknown(word) => write!(f, "ERROR: Unknown command [{}]", word),
            CommandError::NothingToEcho => write!(f, "Nothing to echo"),
            CommandError::InvalidSetArguments => {
                write!(f, "ERROR: Invalid arguments to command SET")
            }
            CommandError::NoKey(command) => {
                write!(f, "ERROR: No key specified to command {}", command)
            }
            CommandError::NoValue => write!(f, "ERROR: No value specified"),
            CommandError::NotFound => write!(f, "NONE"),
        }
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Command::from_str("pInG"), Ok(Command::Ping));
        assert_eq!(Command::from_str("PING\n"), Ok(Command::Ping));
        assert_eq!(
            Command::from_str("get schwifty\n"),
            Ok(Command::Get(Some("schwifty".to_string())))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            Command::from_str("spiarmf slurmp"),
            Err(CommandError::Unknown("SPIARMF".to_string()))
        );
        assert_eq!(
            Command::from_str("\n").unwrap_err().to_string(),
            "ERROR: Unknown command []"
        );
    }

    #[test]
    fn test_parse_keeps_argument_spacing() {
        assert_eq!(
            Command::from_str("echo  two  spaces\n"),
            Ok(Command::Echo(Some(" two  spaces".to_string())))
        );
    }

    #[test]
    fn test_ping_and_echo() {
        let storage = Storage::new();
        assert_eq!(respond("PING\n", &storage), "PONG");
        assert_eq!(respond("ECHO hello world\n", &storage), "hello world");
        assert_eq!(respond("ECHO\n", &storage), "Nothing to echo");
    }

    #[test]
    fn test_set_then_get() {
        let storage = Storage::new();
        assert_eq!(
            respond("SET greeting hello there\n", &storage),
            "SET \"greeting\":\"hello there\""
        );
        assert_eq!(respond("GET greeting\n", &storage), "hello there");
        assert_eq!(respond("get  greeting \n", &storage), "hello there");
    }

    #[test]
    fn test_set_errors() {
        let storage = Storage::new();
        assert_eq!(
            respond("SET\n", &storage),
            "ERROR: Invalid arguments to command SET"
        );
        assert_eq!(respond("SET key\n", &storage), "ERROR: No value specified");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_set_empty_key() {
        let storage = Storage::new();
        assert_eq!(respond("SET  value\n", &storage), "SET \"\":\"value\"");
        assert_eq!(storage.get("").as_deref(), Some("value"));
    }

    #[test]
    fn test_get_missing() {
        let storage = Storage::new();
        assert_eq!(respond("GET nothing\n", &storage), "NONE");
        assert_eq!(
            respond("GET\n", &storage),
            "ERROR: No key specified to command GET"
        );
    }

    #[test]
    fn test_del() {
        let storage = Storage::new();
        storage.set("k", "v");
        assert_eq!(respond("DEL k\n", &storage), "DEL \"k\"");
        assert_eq!(respond("DEL k\n", &storage), "NONE");
        assert_eq!(respond("GET k\n", &storage), "NONE");
        assert_eq!(
            respond("DEL\n", &storage),
            "ERROR: No key specified to command DEL"
        );
    }
}
