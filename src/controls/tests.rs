use super::*;

fn parse(s: &str) -> ControlCmd {
    s.parse().unwrap()
}

#[test]
fn parses_transport_words() {
    assert_eq!(parse("play"), ControlCmd::Play);
    assert_eq!(parse("  PAUSE "), ControlCmd::Pause);
    assert_eq!(parse("toggle"), ControlCmd::PlayPause);
    assert_eq!(parse("stop"), ControlCmd::Stop);
    assert_eq!(parse("next"), ControlCmd::Next);
    assert_eq!(parse("prev"), ControlCmd::Prev);
    assert_eq!(parse("quit"), ControlCmd::Quit);
}

#[test]
fn parses_arguments() {
    assert_eq!(parse("seek 42.5"), ControlCmd::SetPosition(42.5));
    assert_eq!(parse("+10"), ControlCmd::SeekBy(10.0));
    assert_eq!(parse("-2.5"), ControlCmd::SeekBy(-2.5));
    assert_eq!(parse("vol 0.3"), ControlCmd::SetVolume(0.3));
    assert_eq!(parse("jump 4"), ControlCmd::JumpTo(4));
    assert_eq!(parse("repeat"), ControlCmd::CycleRepeat);
    assert_eq!(parse("repeat all"), ControlCmd::SetRepeat(RepeatMode::All));
    assert_eq!(
        parse("play Artist/Album/01 Intro.flac"),
        ControlCmd::PlayTrack("Artist/Album/01 Intro.flac".into())
    );
    assert_eq!(parse("add x.mp3"), ControlCmd::Enqueue("x.mp3".into()));
}

#[test]
fn rejects_garbage() {
    for bad in ["", "   ", "dance", "seek", "seek soon", "vol nan", "jump -1", "+", "repeat often"] {
        assert!(bad.parse::<ControlCmd>().is_err(), "accepted {bad:?}");
    }
}
