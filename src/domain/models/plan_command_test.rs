use super::plan_help_text;
use super::PlanCommand;

#[test]
fn it_parse_empty_string() {
    assert!(PlanCommand::parse("").is_none());
}

#[test]
fn it_parse_space_only() {
    assert!(PlanCommand::parse("   ").is_none());
}

#[test]
fn it_parse_unknown_command() {
    assert!(PlanCommand::parse("teleport 1").is_none());
}

#[test]
fn it_parse_valid_command() {
    let cmd = PlanCommand::parse("add 2").unwrap();
    assert!(cmd.is_add());
    assert_eq!(cmd.args, vec!["2".to_string()]);
}

#[test]
fn it_is_case_insensitive() {
    let cmd = PlanCommand::parse("QUIT").unwrap();
    assert!(cmd.is_quit());
}

#[test]
fn it_requires_args_for_add_and_remove() {
    assert!(PlanCommand::parse("add").is_none());
    assert!(PlanCommand::parse("rm").is_none());
    assert!(PlanCommand::parse("search").is_none());
}

#[test]
fn it_requires_a_single_vehicle() {
    assert!(PlanCommand::parse("vehicle bike").unwrap().is_vehicle());
    assert!(PlanCommand::parse("vehicle bike foot").is_none());
}

#[test]
fn it_converts_positions_to_indexes() {
    assert_eq!(PlanCommand::parse("rm 1").unwrap().position(), Some(0));
    assert_eq!(PlanCommand::parse("rm 3").unwrap().position(), Some(2));
    assert_eq!(PlanCommand::parse("rm 0").unwrap().position(), None);
    assert_eq!(PlanCommand::parse("rm abc").unwrap().position(), None);
}

#[test]
fn it_splits_save_name_and_flags() {
    let cmd = PlanCommand::parse("save Corfu  west coast --public").unwrap();
    assert!(cmd.is_save());
    assert!(cmd.has_flag("--public"));
    assert_eq!(cmd.text(), "Corfu west coast");
}

#[test]
fn it_allows_save_without_name() {
    let cmd = PlanCommand::parse("save").unwrap();
    assert!(cmd.is_save());
    assert_eq!(cmd.text(), "");
}

#[test]
fn it_lists_every_command_in_help() {
    let help = plan_help_text();
    for cmd in ["search", "add", "remove", "list", "vehicle", "compute", "save", "clear", "help", "quit"] {
        assert!(help.contains(&format!("- {cmd}")), "missing {cmd}");
    }
}
