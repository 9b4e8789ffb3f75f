pub struct CommandDef {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

pub static COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "events",
        aliases: &["ev"],
        description: "Switch to events view",
    },
    CommandDef {
        name: "stats",
        aliases: &["st"],
        description: "Switch to stats view",
    },
    CommandDef {
        name: "window",
        aliases: &["w"],
        description: "Fetch window in hours (e.g. :window 6, 0 = all)",
    },
    CommandDef {
        name: "limit",
        aliases: &["l"],
        description: "Maximum events per fetch (e.g. :limit 200)",
    },
    CommandDef {
        name: "export",
        aliases: &["e"],
        description: "Export visible events (:export csv|json)",
    },
    CommandDef {
        name: "import",
        aliases: &["i"],
        description: "Show a CSV export as a snapshot (:import file.csv)",
    },
    CommandDef {
        name: "live",
        aliases: &[],
        description: "Leave a snapshot and refetch",
    },
    CommandDef {
        name: "clear",
        aliases: &["c"],
        description: "Clear search and filters",
    },
    CommandDef {
        name: "quit",
        aliases: &["q"],
        description: "Quit busmon",
    },
    CommandDef {
        name: "help",
        aliases: &["h"],
        description: "Show help",
    },
];

pub fn matching_commands(input: &str) -> Vec<&'static CommandDef> {
    let input_lower = input.to_lowercase();
    COMMANDS
        .iter()
        .filter(|cmd| {
            cmd.name.starts_with(&input_lower)
                || cmd.aliases.iter().any(|a| a.starts_with(&input_lower))
        })
        .collect()
}
