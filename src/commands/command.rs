/// A parsed !command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    /// The command name
    pub cmd: &'a str,
    /// Optional args, trimmed
    pub args: Option<&'a str>,
}

impl<'a> Command<'a> {
    /// Attempts parse the command from a chat line
    pub fn parse(data: &'a str) -> Option<Command<'a>> {
        const TRIGGER: &str = "!";

        if !data.starts_with(TRIGGER) || data.len() == TRIGGER.len() {
            return None;
        }

        let mut iter = data.splitn(2, ' ');
        let (head, tail) = (iter.next()?, iter.next());

        let cmd = &head[TRIGGER.len()..];
        if cmd.is_empty() {
            return None;
        }

        Some(Command {
            cmd,
            args: tail.map(str::trim).filter(|args| !args.is_empty()),
        })
    }
}
