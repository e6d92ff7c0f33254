use std::{
    io::{self, BufRead},
    sync::mpsc::{channel, Receiver},
    thread,
};

use log::{info, warn};

use thengill_shared::{MenuCommand, MenuInput};

/// Menu input typed on stdin: `w`/`s` move, `a`/`d` change a setting, an
/// empty line selects and `q` goes back.
pub struct StdinInput {
    commands: Receiver<MenuCommand>,
}

impl StdinInput {
    pub fn spawn() -> Self {
        let (sender, commands) = channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match parse_command(&line) {
                    Some(command) => {
                        if sender.send(command).is_err() {
                            break;
                        }
                    }
                    None => warn!("Unknown command `{}`", line.trim()),
                }
            }
            info!("stdin closed, no more menu input");
        });
        Self { commands }
    }
}

impl MenuInput for StdinInput {
    fn poll(&mut self) -> Vec<MenuCommand> {
        self.commands.try_iter().collect()
    }
}

fn parse_command(line: &str) -> Option<MenuCommand> {
    match line.trim() {
        "w" | "up" => Some(MenuCommand::Up),
        "s" | "down" => Some(MenuCommand::Down),
        "a" | "-" => Some(MenuCommand::Decrease),
        "d" | "+" => Some(MenuCommand::Increase),
        "" | "enter" => Some(MenuCommand::Select),
        "q" | "back" => Some(MenuCommand::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_map_to_commands() {
        assert_eq!(parse_command(" w "), Some(MenuCommand::Up));
        assert_eq!(parse_command(""), Some(MenuCommand::Select));
        assert_eq!(parse_command("+"), Some(MenuCommand::Increase));
        assert_eq!(parse_command("jump"), None);
    }
}
