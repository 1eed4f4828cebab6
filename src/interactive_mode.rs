// interactive_mode.rs
use crate::input_process::Assistant;

use log::{error, info};
use std::io::{self, BufRead, Write};

const IMAGE_COMMAND: &str = "/image ";

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    Exit,
    Skip,
    Chat(&'a str),
    Image(&'a str),
}

pub fn parse_line(line: &str) -> ConsoleCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        ConsoleCommand::Skip
    } else if line.eq_ignore_ascii_case("exit") {
        ConsoleCommand::Exit
    } else if let Some(text) = line.strip_prefix(IMAGE_COMMAND) {
        ConsoleCommand::Image(text.trim())
    } else {
        ConsoleCommand::Chat(line)
    }
}

/// Console front end: plain lines go to the chat flow, `/image <text>` to the
/// image flow, `exit` leaves.
pub async fn run_interactive_mode(assistant: Assistant) -> io::Result<()> {
    let stdin = io::stdin();
    loop {
        print!("\nYou:\n");
        io::stdout().flush()?;

        let mut user_input = String::new();
        if stdin.lock().read_line(&mut user_input)? == 0 {
            info!("Console input closed");
            break;
        }

        match parse_line(&user_input) {
            ConsoleCommand::Exit => {
                info!("User requested exit");
                break;
            }
            ConsoleCommand::Skip => continue,
            ConsoleCommand::Chat(text) => match assistant.run_chat(text).await {
                Ok(chat) => println!("\nGeriApp:\n{}", chat.reply),
                Err(e) => error!("Error processing chat input: {:#}", e),
            },
            ConsoleCommand::Image(text) => match assistant.run_image(text).await {
                Ok(image) if image.url.is_empty() => println!("\nGeriApp:\nNo image was returned."),
                Ok(image) => println!("\nGeriApp:\nYou can view the image here: {}", image.url),
                Err(e) => error!("Error processing image input: {:#}", e),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_map_to_flows() {
        assert_eq!(parse_line("  exit \n"), ConsoleCommand::Exit);
        assert_eq!(parse_line("EXIT"), ConsoleCommand::Exit);
        assert_eq!(parse_line("\n"), ConsoleCommand::Skip);
        assert_eq!(parse_line("/image svg kočka\n"), ConsoleCommand::Image("svg kočka"));
        assert_eq!(parse_line("Jak se máš?\n"), ConsoleCommand::Chat("Jak se máš?"));
        assert_eq!(parse_line("/images"), ConsoleCommand::Chat("/images"));
    }
}
