mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use session::{ScriptProfile, Session};

fn main() -> io::Result<()> {
    let profile = parse_profile().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!(
            "Usage: reaction-emulator [--script <taps|quiet>] | reaction-emulator <taps|quiet>"
        );
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(profile);
    let mut line = String::new();

    writeln!(
        writer,
        "Reaction Timer Emulator ready. Send `<count>,<limit_ms>,` to run a trial or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_line(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_profile() -> Result<ScriptProfile, String> {
    let mut args = env::args().skip(1);
    if let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--script=") {
            ScriptProfile::from_tag(value)
        } else if arg == "--script" {
            if let Some(value) = args.next() {
                ScriptProfile::from_tag(&value)
            } else {
                Err("Expected value after --script".to_string())
            }
        } else {
            ScriptProfile::from_tag(&arg)
        }
    } else {
        Ok(ScriptProfile::Taps)
    }
}
