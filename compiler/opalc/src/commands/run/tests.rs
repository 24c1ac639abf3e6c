use super::*;
use pretty_assertions::assert_eq;

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(ToString::to_string).collect()
}

#[test]
fn test_parse_path_only() {
    assert_eq!(
        parse_run_args(&args(&["main.opal"])),
        Ok(("main.opal".to_string(), RunOptions::default()))
    );
}

#[test]
fn test_parse_flags_anywhere() {
    let parsed = parse_run_args(&args(&["--profile", "main.opal", "--max-depth=64"]));
    assert_eq!(
        parsed,
        Ok((
            "main.opal".to_string(),
            RunOptions {
                max_depth: Some(64),
                profile: true,
            }
        ))
    );
}

#[test]
fn test_parse_rejects_bad_input() {
    assert_eq!(
        parse_run_args(&args(&["main.opal", "--max-depth=lots"])),
        Err("invalid --max-depth value 'lots'".to_string())
    );
    assert_eq!(
        parse_run_args(&args(&["--verbose", "main.opal"])),
        Err("unknown option '--verbose'".to_string())
    );
    assert_eq!(
        parse_run_args(&args(&["a.opal", "b.opal"])),
        Err("unexpected argument 'b.opal'".to_string())
    );
    assert_eq!(parse_run_args(&[]), Err("missing file path".to_string()));
}
