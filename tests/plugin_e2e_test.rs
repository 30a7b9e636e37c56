//! End-to-end tests for the notification pipeline (hook → config → cooldown → dispatch)

use std::sync::Mutex;

use opencode_notifier::notification::{
    CommandOutput, CommandRunner, PermissionInput, Platform, PluginEvent, ToolInput,
};
use opencode_notifier::{
    Channel, HandleOutcome, HostHook, NotificationDispatcher, NotificationEventType,
    NotifierPlugin, PluginConfig, PluginContext, SendResult, SoundCatalog,
};
use serde_json::json;

/// 记录所有命令调用的 runner
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingRunner {
    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(p, _)| p == program)
            .map(|(_, args)| args)
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        Ok(CommandOutput::ok())
    }

    fn is_available(&self, _program: &str) -> bool {
        true
    }
}

struct Fixture {
    assets: tempfile::TempDir,
    plugin: NotifierPlugin<RecordingRunner>,
}

impl Fixture {
    fn new(config: serde_json::Value) -> Self {
        let assets = tempfile::tempdir().unwrap();
        let sounds = assets.path().join("sounds");
        std::fs::create_dir_all(&sounds).unwrap();
        for f in ["default.mp3", "chime.wav"] {
            std::fs::write(sounds.join(f), b"").unwrap();
        }

        let dispatcher = NotificationDispatcher::new(
            RecordingRunner::default(),
            Platform::Linux,
            SoundCatalog::from_assets_dir(assets.path()),
        );
        let plugin = NotifierPlugin::new(
            PluginConfig::from_value(&config),
            &PluginContext::new("/home/dev/demo"),
            dispatcher,
        );

        Self { assets, plugin }
    }

    fn runner(&self) -> &RecordingRunner {
        self.plugin.dispatcher().runner()
    }

    fn sound_path(&self, file: &str) -> String {
        self.assets
            .path()
            .join("sounds")
            .join(file)
            .to_string_lossy()
            .into_owned()
    }
}

#[tokio::test]
async fn test_defaults_session_idle_dispatches_both_channels() {
    let fx = Fixture::new(json!({}));

    let outcome = fx.plugin.on_event(&PluginEvent::new("session.idle")).await;

    assert_eq!(
        outcome,
        Some(HandleOutcome::Dispatched {
            message: "Generation completed".to_string(),
            results: vec![(Channel::Desktop, SendResult::Sent), (Channel::Sound, SendResult::Sent)],
        })
    );
    assert_eq!(
        fx.runner().calls_to("notify-send"),
        vec![vec!["OpenCode".to_string(), "Generation completed".to_string()]]
    );
    let sound_calls = fx.runner().calls_to("ffplay");
    assert_eq!(sound_calls.len(), 1);
    assert_eq!(sound_calls[0][5], "80");
    assert_eq!(sound_calls[0][6], fx.sound_path("default.mp3"));
}

#[tokio::test]
async fn test_master_switch_off_suppresses_everything() {
    let fx = Fixture::new(json!({"enabled": false}));

    fx.plugin.on_event(&PluginEvent::new("session.idle")).await;
    fx.plugin.on_event(&PluginEvent::new("session.error")).await;
    fx.plugin
        .on_permission_ask(&PermissionInput {
            permission_type: "bash".to_string(),
        })
        .await;
    fx.plugin
        .on_tool_execute_before(&ToolInput {
            tool: "question".to_string(),
        })
        .await;

    assert!(fx.runner().calls().is_empty());
    assert_eq!(fx.plugin.cooldown().last_notification_time(), None);
}

#[tokio::test]
async fn test_cooldown_suppresses_second_event() {
    let fx = Fixture::new(json!({"cooldown": 5}));

    let first = fx
        .plugin
        .handle_at(NotificationEventType::GenerationCompleted, 1_000_000)
        .await;
    let second = fx
        .plugin
        .handle_at(NotificationEventType::GenerationCompleted, 1_001_000)
        .await;

    assert!(matches!(first, HandleOutcome::Dispatched { .. }));
    assert_eq!(second, HandleOutcome::CooledDown);
    assert_eq!(fx.runner().calls_to("notify-send").len(), 1);
    assert_eq!(fx.runner().calls_to("ffplay").len(), 1);
}

#[tokio::test]
async fn test_cooldown_with_wall_clock_events() {
    let fx = Fixture::new(json!({"cooldown": 5}));

    fx.plugin.on_event(&PluginEvent::new("session.idle")).await;
    let second = fx.plugin.on_event(&PluginEvent::new("session.idle")).await;

    assert_eq!(second, Some(HandleOutcome::CooledDown));
    assert_eq!(fx.runner().calls().len(), 2);
}

#[tokio::test]
async fn test_disabled_event_does_not_block_other_events() {
    let fx = Fixture::new(json!({"permissions": {"questionAsked": {"enabled": false}}}));

    let question = fx
        .plugin
        .on_tool_execute_before(&ToolInput {
            tool: "question".to_string(),
        })
        .await;
    let permission = fx.plugin.on_permission_ask(&PermissionInput::default()).await;

    assert_eq!(question, Some(HandleOutcome::EventDisabled));
    match permission {
        HandleOutcome::Dispatched { message, .. } => assert_eq!(message, "Permission requested"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_volume_is_clamped() {
    let fx = Fixture::new(json!({"cooldown": 0, "volume": 1.5}));
    fx.plugin.handle(NotificationEventType::SessionError).await;

    let fx_low = Fixture::new(json!({"cooldown": 0, "volume": -0.3}));
    fx_low.plugin.handle(NotificationEventType::SessionError).await;

    assert_eq!(fx.runner().calls_to("ffplay")[0][5], "100");
    assert_eq!(fx_low.runner().calls_to("ffplay")[0][5], "0");
}

#[tokio::test]
async fn test_per_event_sound_and_template() {
    let fx = Fixture::new(json!({
        "showDesktopNotification": false,
        "permissions": {
            "sessionError": {
                "soundFile": "chime.wav",
                "volume": 0.25,
                "message": "{eventType} in {projectName}"
            }
        }
    }));

    let outcome = fx.plugin.on_event(&PluginEvent::new("session.error")).await;

    assert_eq!(
        outcome,
        Some(HandleOutcome::Dispatched {
            message: "sessionError in demo".to_string(),
            results: vec![(Channel::Sound, SendResult::Sent)],
        })
    );
    assert!(fx.runner().calls_to("notify-send").is_empty());
    let sound_calls = fx.runner().calls_to("ffplay");
    assert_eq!(sound_calls[0][5], "25");
    assert_eq!(sound_calls[0][6], fx.sound_path("chime.wav"));
}

#[tokio::test]
async fn test_missing_sound_file_still_charges_cooldown() {
    let fx = Fixture::new(json!({"soundFile": "missing.mp3"}));

    let outcome = fx.plugin.handle_at(NotificationEventType::SessionError, 0).await;

    match outcome {
        HandleOutcome::Dispatched { results, .. } => {
            assert_eq!(results[0], (Channel::Desktop, SendResult::Sent));
            assert!(matches!(results[1], (Channel::Sound, SendResult::Skipped(_))));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(fx.plugin.cooldown().last_notification_time(), Some(0));
}

#[tokio::test]
async fn test_unrecognized_hooks_are_ignored() {
    let fx = Fixture::new(json!({}));

    let hooks = [
        r#"{"hook":"event","event":{"type":"session.created","sessionID":"ses_9"}}"#,
        r#"{"hook":"event","event":{"type":"message.updated"}}"#,
        r#"{"hook":"tool.execute.before","input":{"tool":"bash"}}"#,
    ];
    for line in hooks {
        let hook = HostHook::parse(line).unwrap();
        assert_eq!(fx.plugin.on_hook(&hook).await, None);
    }

    assert!(fx.runner().calls().is_empty());
    assert_eq!(fx.plugin.last_session_id().as_deref(), Some("ses_9"));
}

#[tokio::test]
async fn test_instances_do_not_share_cooldown() {
    let a = Fixture::new(json!({}));
    let b = Fixture::new(json!({}));

    assert!(matches!(
        a.plugin.handle_at(NotificationEventType::SessionError, 0).await,
        HandleOutcome::Dispatched { .. }
    ));
    assert!(matches!(
        b.plugin.handle_at(NotificationEventType::SessionError, 0).await,
        HandleOutcome::Dispatched { .. }
    ));
}

#[test]
fn test_seed_uses_worktree_before_directory() {
    let context = PluginContext::new("/home/dev/demo/sub").with_worktree("/home/dev/demo");
    assert_eq!(context.seed_path(), "/home/dev/demo");
    assert_eq!(context.project_name().as_deref(), Some("sub"));
}
