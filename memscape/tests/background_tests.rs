use memscape::background::{BackgroundSetter, CommandBackgroundSetter};
use memscape::config::BackgroundConfig;
use tempfile::tempdir;

#[test]
fn test_default_args_use_file_uri() {
    let dir = tempdir().unwrap();
    let image = dir.path().join("wallpaper.png");
    std::fs::write(&image, b"x").unwrap();
    let setter = CommandBackgroundSetter::new(&BackgroundConfig::default());
    let args = setter.expand_args(&image);
    let absolute = image.canonicalize().unwrap();
    assert_eq!(args[..3], ["set", "org.gnome.desktop.background", "picture-uri"]);
    assert_eq!(args[3], format!("file://{}", absolute.display()));
}

#[test]
fn test_path_placeholder() {
    let config = BackgroundConfig {
        enabled: true,
        command: "feh".to_string(),
        args: vec!["--bg-fill".to_string(), "{path}".to_string()],
    };
    let setter = CommandBackgroundSetter::new(&config);
    let args = setter.expand_args(std::path::Path::new("/nonexistent/wall.png"));
    assert_eq!(args, vec!["--bg-fill", "/nonexistent/wall.png"]);
}

#[test]
fn test_missing_command_is_not_fatal() {
    let config = BackgroundConfig {
        enabled: true,
        command: "memscape-no-such-command".to_string(),
        args: vec![],
    };
    CommandBackgroundSetter::new(&config).apply(std::path::Path::new("/nonexistent/wall.png"));
}
