#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "logout",
        action: "logout",
    },
    CommandSpec {
        command: "back",
        action: "back",
    },
    CommandSpec {
        command: "options",
        action: "options",
    },
    CommandSpec {
        command: "clear",
        action: "clear",
    },
    CommandSpec {
        command: "submit",
        action: "submit",
    },
    CommandSpec {
        command: "history",
        action: "history",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "providers",
        action: "providers",
    },
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
    CommandSpec {
        command: "exit",
        action: "quit",
    },
];

pub(crate) const SETTING_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "count",
        action: "set_count",
    },
    CommandSpec {
        command: "resolution",
        action: "set_resolution",
    },
    CommandSpec {
        command: "scale",
        action: "set_scale",
    },
];

pub(crate) const IMAGE_SLOTS: &[&str] = &["main", "sample1", "sample2", "sample3", "input"];

pub const CHAT_HELP_COMMANDS: &[(&str, &str)] = &[
    ("/login google|replicate <key>", "verify a credential and sign in"),
    ("/logout", "forget the credential and return to login"),
    (
        "/mode generation|edit|outfit|face|background|color|upscale",
        "open a form (edit opens the edit menu)",
    ),
    ("/back", "return to the previous menu"),
    ("/set <attribute> <value>", "change the generation draft"),
    ("/options", "list attributes and their values"),
    ("/count <1-4>", "number of generated images"),
    ("/resolution 2k|4k", "generation size"),
    ("/scale 2x|4x", "upscale factor"),
    (
        "/image main|sample1|sample2|sample3|input <path>",
        "attach a reference image",
    ),
    ("/clear", "drop attached images"),
    ("/submit", "run the current form"),
    ("/save [dir]", "write the last result to disk"),
    ("/history", "list results from this session"),
    ("/status", "show provider and screen"),
    ("/providers", "list providers and the screens each one offers"),
    ("/help", "show this list"),
    ("/quit", "leave"),
];
