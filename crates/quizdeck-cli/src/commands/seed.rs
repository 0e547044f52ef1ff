//! The `quizdeck seed` command.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use quizdeck_core::access::Caller;
use quizdeck_core::accounts::AccountService;
use quizdeck_core::model::Role;
use quizdeck_core::parser::load_quiz_path;
use quizdeck_core::service::QuizService;
use quizdeck_core::validation::RegistrationDraft;
use quizdeck_server::config::load_config_from;
use quizdeck_server::JwtCredentials;

pub async fn execute(
    config: Option<PathBuf>,
    quizzes: Option<PathBuf>,
    admin_username: String,
    admin_email: String,
    admin_password: String,
) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let files = match &quizzes {
        Some(path) => load_quiz_path(path)?,
        None => Vec::new(),
    };

    let store = quizdeck_store::open_store(&config.database_url).await?;
    let credentials = Arc::new(JwtCredentials::new(
        &config.jwt_secret,
        config.jwt_expires_secs,
    ));
    let accounts = AccountService::new(store.clone(), credentials).with_admin_registration(true);

    let admin_id = match store.find_by_username(admin_username.trim()).await? {
        Some(user) if user.role == Role::Admin => {
            println!("Admin user '{}' already exists.", user.username);
            user.id
        }
        Some(user) => anyhow::bail!("user '{}' exists but is not an admin", user.username),
        None => {
            let session = accounts
                .register(&RegistrationDraft {
                    username: Some(admin_username),
                    email: Some(admin_email),
                    password: Some(admin_password),
                    role: Some(Role::Admin.to_string()),
                })
                .await
                .context("failed to create admin user")?;
            println!("Created admin user '{}'.", session.user.username);
            session.user.id
        }
    };

    if files.is_empty() {
        return Ok(());
    }

    let service = QuizService::new(store.clone());
    let admin = Caller::user(admin_id, Role::Admin);
    let mut existing: HashSet<String> = store
        .list_quizzes(true)
        .await?
        .into_iter()
        .map(|q| q.title)
        .collect();

    let mut created = 0;
    for file in &files {
        let title = file.title().trim().to_string();
        if existing.contains(&title) {
            println!("Quiz '{title}' already exists, skipping.");
            continue;
        }
        let quiz = service
            .create_quiz(&admin, &file.draft)
            .await
            .with_context(|| format!("failed to load {}", file.source.display()))?;
        println!("  - {} ({} questions)", quiz.title, quiz.questions.len());
        existing.insert(title);
        created += 1;
    }
    println!("Loaded {created} quiz(zes).");

    Ok(())
}
