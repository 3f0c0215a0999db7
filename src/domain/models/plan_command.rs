#[cfg(test)]
#[path = "plan_command_test.rs"]
mod tests;

pub struct PlanCommand {
    command: String,
    pub args: Vec<String>,
}

impl PlanCommand {
    pub fn parse(text: &str) -> Option<PlanCommand> {
        let mut args = text
            .split_whitespace()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0).to_lowercase();

        let cmd = PlanCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_search()
            || cmd.is_add()
            || cmd.is_remove()
            || cmd.is_list()
            || cmd.is_vehicle()
            || cmd.is_compute()
            || cmd.is_save()
            || cmd.is_clear()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Arguments joined back together, without flags.
    pub fn text(&self) -> String {
        return self
            .args
            .iter()
            .filter(|e| return !e.starts_with("--"))
            .map(|e| return e.as_str())
            .collect::<Vec<&str>>()
            .join(" ");
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        return self.args.iter().any(|e| return e == flag);
    }

    /// First argument as a 1-based position, converted to an index.
    pub fn position(&self) -> Option<usize> {
        let pos = self.args.first()?.parse::<usize>().ok()?;
        if pos == 0 {
            return None;
        }

        return Some(pos - 1);
    }

    pub fn is_quit(&self) -> bool {
        return ["q", "quit", "exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["h", "help", "?"].contains(&self.command.as_str());
    }

    pub fn is_search(&self) -> bool {
        return ["s", "search"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_add(&self) -> bool {
        return ["a", "add"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_remove(&self) -> bool {
        return ["rm", "remove"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    pub fn is_list(&self) -> bool {
        return ["l", "ls", "list"].contains(&self.command.as_str());
    }

    pub fn is_vehicle(&self) -> bool {
        return ["v", "vehicle"].contains(&self.command.as_str()) && self.args.len() == 1;
    }

    pub fn is_compute(&self) -> bool {
        return ["c", "compute"].contains(&self.command.as_str());
    }

    pub fn is_save(&self) -> bool {
        return ["save"].contains(&self.command.as_str());
    }

    pub fn is_clear(&self) -> bool {
        return ["clear"].contains(&self.command.as_str());
    }
}

pub fn plan_help_text() -> String {
    let text = r#"
PLAN COMMANDS:
- search (s) [TEXT] - Searches points of interest by name or description.
- add (a) [RESULT_NUMBER,POI_ID] - Adds a waypoint, either by its number in the last search results or by POI id.
- remove (rm) [WAYPOINT_NUMBER] - Removes a waypoint from the draft.
- list (ls) - Lists the waypoints in the draft and the last computed route.
- vehicle (v) [car,bike,foot] - Sets the vehicle used to compute the route.
- compute (c) - Computes a route through all waypoints in order.
- save [NAME] [--public] - Saves the computed route under NAME. Requires being logged in.
- clear - Removes all waypoints.
- help (h) - Provides this help menu.
- quit (q) - Exit the planner.
        "#;

    return text.trim().to_string();
}
