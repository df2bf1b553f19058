//! Parsing of lines typed at the prompt.

use codepair_server::infrastructure::dto::websocket::PlaybackActionDto;

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    /// Plain text goes to the room chat
    Chat(String),
    /// `/play [seconds] [video_id]`, `/pause [seconds]`, `/seek <seconds>`
    Playback {
        action: PlaybackActionDto,
        time: Option<f64>,
        video_id: Option<String>,
    },
    /// `/sync`
    Sync,
    /// `/nav`: announce in-app navigation before a reconnect
    Navigate,
    /// `/end` (creator only)
    End,
    /// `/leave`
    Leave,
    /// `/help`
    Help,
    /// Unrecognized slash command or bad argument
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>                    send a chat message
  /play [seconds] [video]   play (optionally load a video)
  /pause [seconds]          pause
  /seek <seconds>           seek
  /sync                     fetch the authoritative playback state
  /nav                      announce a navigation (longer reconnect window)
  /end                      end the room (creator only)
  /leave                    leave the room
";

fn parse_seconds(arg: &str) -> Result<f64, String> {
    match arg.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(format!("'{}' is not a position in seconds", arg)),
    }
}

pub fn parse_input(line: &str) -> InputCommand {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return InputCommand::Chat(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let playback = |action: PlaybackActionDto, time: Option<&&str>, video_id: Option<&&str>| {
        let time = match time.map(|arg| parse_seconds(arg)).transpose() {
            Ok(time) => time,
            Err(e) => return InputCommand::Invalid(e),
        };
        InputCommand::Playback {
            action,
            time,
            video_id: video_id.map(|v| v.to_string()),
        }
    };

    match (name, args.as_slice()) {
        ("play", [..]) if args.len() <= 2 => {
            playback(PlaybackActionDto::Play, args.first(), args.get(1))
        }
        ("pause", [..]) if args.len() <= 1 => {
            playback(PlaybackActionDto::Pause, args.first(), None)
        }
        ("seek", [_]) => playback(PlaybackActionDto::Seek, args.first(), None),
        ("seek", _) => InputCommand::Invalid("usage: /seek <seconds>".to_string()),
        ("sync", []) => InputCommand::Sync,
        ("nav", []) => InputCommand::Navigate,
        ("end", []) => InputCommand::End,
        ("leave", []) => InputCommand::Leave,
        ("help", _) => InputCommand::Help,
        _ => InputCommand::Invalid(format!("unknown command '/{}' (try /help)", rest)),
    }
}
