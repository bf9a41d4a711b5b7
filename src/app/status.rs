use crate::chat::Orchestrator;
use crate::config::Config;
use crate::identity::Identity;
use crate::ui;

pub fn render_whoami(orchestrator: &Orchestrator) -> String {
    let identity = orchestrator.identity();
    let session = orchestrator.session_id();

    let who = match &identity {
        None => "signed out".to_string(),
        Some(Identity::Anonymous { .. }) => "anonymous (this device)".to_string(),
        Some(Identity::Authenticated {
            display_name,
            email,
            ..
        }) => match email {
            Some(email) => format!("{display_name} <{email}>"),
            None => display_name.clone(),
        },
    };

    let mut lines = vec![format!("identity  {}", ui::value(who))];
    match session {
        Some(id) => lines.push(format!("session   {}", ui::value(id))),
        None => lines.push(format!(
            "session   {}",
            ui::yellow("none: run `recallchat login` or `recallchat anonymous`")
        )),
    }
    lines.join("\n")
}

pub fn render_status(config: &Config, orchestrator: &Orchestrator) -> String {
    let lines = [
        format!("◆ {}", ui::header("recallchat")),
        String::new(),
        render_whoami(orchestrator),
        String::new(),
        format!("service   {}", config.api.base_url),
        format!("timeout   {}s", config.api.timeout_secs),
        format!(
            "data      {}",
            config.storage.resolved_data_dir().display()
        ),
        format!("config    {}", config.config_path.display()),
        format!("version   {}", env!("CARGO_PKG_VERSION")),
    ];
    lines.join("\n")
}
