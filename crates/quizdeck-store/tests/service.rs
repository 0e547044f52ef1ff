//! Service-level behaviour over both store backends.

use std::sync::Arc;

use quizdeck_core::access::Caller;
use quizdeck_core::accounts::{AccountService, Credentials, LoginRequest};
use quizdeck_core::error::QuizError;
use quizdeck_core::model::{Answers, Role, User};
use quizdeck_core::service::{QuizService, SubmitRequest};
use quizdeck_core::traits::Store;
use quizdeck_core::validation::{QuestionDraft, QuizDraft, QuizPatch, RegistrationDraft};
use quizdeck_store::{open_store, MemoryStore};
use serde_json::json;

/// Stores passwords verbatim and issues predictable tokens.
struct PlainCredentials;

impl Credentials for PlainCredentials {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash == format!("plain:{password}")
    }

    fn issue_token(&self, user: &User) -> anyhow::Result<String> {
        Ok(format!("token-{}", user.id))
    }
}

struct Fixture {
    quizzes: QuizService,
    accounts: AccountService,
    admin: Caller,
    student: Caller,
}

async fn fixture(store: Arc<dyn Store>) -> Fixture {
    let accounts = AccountService::new(store.clone(), Arc::new(PlainCredentials));
    let admin = accounts
        .register(&registration("admin", "admin"))
        .await
        .unwrap();
    let student = accounts
        .register(&registration("student", "student"))
        .await
        .unwrap();
    Fixture {
        quizzes: QuizService::new(store),
        accounts,
        admin: Caller::user(admin.user.id, Role::Admin),
        student: Caller::user(student.user.id, Role::Student),
    }
}

fn registration(name: &str, role: &str) -> RegistrationDraft {
    RegistrationDraft {
        username: Some(name.into()),
        email: Some(format!("{name}@Example.com")),
        password: Some("secret123".into()),
        role: Some(role.into()),
    }
}

fn question(text: &str, ty: &str, options: &[&str], correct: &str, points: i64) -> QuestionDraft {
    QuestionDraft {
        question_text: Some(text.into()),
        question_type: Some(ty.into()),
        options: (!options.is_empty()).then(|| options.iter().map(|o| o.to_string()).collect()),
        correct_answer: Some(correct.into()),
        points: Some(points),
    }
}

fn sample_draft() -> QuizDraft {
    QuizDraft {
        title: Some("Rust Basics".into()),
        description: Some("Ownership and friends".into()),
        is_active: None,
        questions: Some(vec![
            question("Immutable binding?", "multiple_choice", &["let", "mut", "const"], "let", 10),
            question("Rust has a GC.", "true_false", &[], "False", 5),
            question("Unit of compilation?", "text", &[], "crate", 10),
        ]),
    }
}

fn answers(pairs: &[(i64, serde_json::Value)]) -> Option<Answers> {
    Some(pairs.iter().cloned().collect())
}

async fn backends() -> Vec<Arc<dyn Store>> {
    vec![
        Arc::new(MemoryStore::new()),
        open_store("sqlite::memory:").await.unwrap(),
    ]
}

#[tokio::test]
async fn submit_scores_and_records() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        let ids: Vec<i64> = quiz.questions.iter().map(|q| q.id).collect();

        let outcome = fx
            .quizzes
            .submit(
                &fx.student,
                quiz.id,
                &SubmitRequest {
                    answers: answers(&[
                        (ids[0], json!("let")),
                        (ids[1], json!("TRUE")),
                        (ids[2], json!(" Crate ")),
                    ]),
                    name: Some("  ".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.score, 20);
        assert_eq!(outcome.total_points, 25);
        assert_eq!(outcome.percentage, 80.0);
        assert!(outcome.participant_name.is_none());
        assert!(!outcome.results[&ids[1]].is_correct);

        let mine = fx.quizzes.my_submissions(&fx.student).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, outcome.submission_id);

        let all = fx.quizzes.quiz_submissions(&fx.admin, quiz.id).await.unwrap();
        assert_eq!(all.quiz_title, "Rust Basics");
        assert_eq!(all.stats.submission_count, 1);
        assert_eq!(all.stats.average_percentage, 80.0);
    }
}

#[tokio::test]
async fn stale_identity_submits_anonymously() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        let first = quiz.questions[0].id;

        // A valid token for an account that no longer exists.
        let ghost = Caller::user(999, Role::Student);
        let outcome = fx
            .quizzes
            .submit(
                &ghost,
                quiz.id,
                &SubmitRequest {
                    answers: answers(&[(first, json!("let"))]),
                    name: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.score, 10);

        let all = fx.quizzes.quiz_submissions(&fx.admin, quiz.id).await.unwrap();
        assert_eq!(all.submissions.len(), 1);
        assert_eq!(all.submissions[0].user_id, None);
        assert!(fx.quizzes.my_submissions(&ghost).await.unwrap().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let file_url = format!("sqlite://{}", dir.path().join("quiz.db").display());
    let stores: Vec<Arc<dyn Store>> = vec![
        Arc::new(MemoryStore::new()),
        open_store(&file_url).await.unwrap(),
    ];

    for store in stores {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        let first = quiz.questions[0].id;

        let mut handles = Vec::new();
        for i in 0..40 {
            let quizzes = fx.quizzes.clone();
            let caller = if i % 2 == 0 { fx.student } else { Caller::Anonymous };
            let quiz_id = quiz.id;
            handles.push(tokio::spawn(async move {
                quizzes
                    .submit(
                        &caller,
                        quiz_id,
                        &SubmitRequest {
                            answers: answers(&[(first, json!("let"))]),
                            name: Some(format!("taker {i}")),
                        },
                    )
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome.score, 10);
            ids.push(outcome.submission_id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 40);

        let all = fx.quizzes.quiz_submissions(&fx.admin, quiz.id).await.unwrap();
        assert_eq!(all.stats.submission_count, 40);
        assert_eq!(fx.quizzes.my_submissions(&fx.student).await.unwrap().len(), 20);
    }
}

#[tokio::test]
async fn anonymous_submission_keeps_name() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        let first = quiz.questions[0].id;

        let outcome = fx
            .quizzes
            .submit(
                &Caller::Anonymous,
                quiz.id,
                &SubmitRequest {
                    answers: answers(&[(first, json!("Let"))]),
                    name: Some(" Grace ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.participant_name.as_deref(), Some("Grace"));

        let all = fx.quizzes.quiz_submissions(&fx.admin, quiz.id).await.unwrap();
        assert_eq!(all.submissions[0].user_id, None);
    }
}

#[tokio::test]
async fn submit_rejections() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();

        let empty = fx
            .quizzes
            .submit(&fx.student, quiz.id, &SubmitRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(empty, QuizError::Validation(m) if m == "No answers provided"));

        let missing = fx
            .quizzes
            .submit(&fx.student, 999, &SubmitRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, QuizError::NotFound(_)));

        fx.quizzes
            .update_quiz(
                &fx.admin,
                quiz.id,
                &QuizPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let inactive = fx
            .quizzes
            .submit(
                &fx.student,
                quiz.id,
                &SubmitRequest {
                    answers: answers(&[(quiz.questions[0].id, json!("let"))]),
                    name: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(inactive, QuizError::NotFound(_)));

        let all = fx.quizzes.quiz_submissions(&fx.admin, quiz.id).await.unwrap();
        assert!(all.submissions.is_empty());
    }
}

#[tokio::test]
async fn visibility_depends_on_role() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        assert_eq!(quiz.questions[0].correct_answer.as_deref(), Some("let"));

        let as_student = fx.quizzes.get_quiz(&fx.student, quiz.id).await.unwrap();
        assert!(as_student.questions.iter().all(|q| q.correct_answer.is_none()));
        let as_admin = fx.quizzes.get_quiz(&fx.admin, quiz.id).await.unwrap();
        assert!(as_admin.questions.iter().all(|q| q.correct_answer.is_some()));

        fx.quizzes
            .update_quiz(
                &fx.admin,
                quiz.id,
                &QuizPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(fx.quizzes.list_quizzes(&Caller::Anonymous).await.unwrap().is_empty());
        assert_eq!(fx.quizzes.list_quizzes(&fx.admin).await.unwrap().len(), 1);
        assert!(matches!(
            fx.quizzes.get_quiz(&fx.student, quiz.id).await,
            Err(QuizError::NotFound(_))
        ));
        assert!(fx.quizzes.get_quiz(&fx.admin, quiz.id).await.is_ok());
    }
}

#[tokio::test]
async fn quiz_management_requires_admin() {
    for store in backends().await {
        let fx = fixture(store).await;

        let anon = fx
            .quizzes
            .create_quiz(&Caller::Anonymous, &sample_draft())
            .await
            .unwrap_err();
        assert!(matches!(anon, QuizError::Unauthorized));

        let student = fx
            .quizzes
            .create_quiz(&fx.student, &sample_draft())
            .await
            .unwrap_err();
        assert!(matches!(student, QuizError::Forbidden(_)));

        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
        assert!(matches!(
            fx.quizzes.delete_quiz(&fx.student, quiz.id).await,
            Err(QuizError::Forbidden(_))
        ));
        assert!(matches!(
            fx.quizzes.quiz_submissions(&fx.student, quiz.id).await,
            Err(QuizError::Forbidden(_))
        ));

        fx.quizzes.delete_quiz(&fx.admin, quiz.id).await.unwrap();
        assert!(matches!(
            fx.quizzes.delete_quiz(&fx.admin, quiz.id).await,
            Err(QuizError::NotFound(_))
        ));
    }
}

#[tokio::test]
async fn update_replaces_question_set() {
    for store in backends().await {
        let fx = fixture(store).await;
        let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();

        let updated = fx
            .quizzes
            .update_quiz(
                &fx.admin,
                quiz.id,
                &QuizPatch {
                    title: Some("Rust Advanced".into()),
                    description: Some("   ".into()),
                    questions: Some(vec![question("Lifetimes?", "text", &[], "'a", 3)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Rust Advanced");
        assert!(updated.description.is_none());
        assert_eq!(updated.questions.len(), 1);

        let bad = fx
            .quizzes
            .update_quiz(
                &fx.admin,
                quiz.id,
                &QuizPatch {
                    title: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad, QuizError::Validation(_)));

        let missing = fx
            .quizzes
            .update_quiz(&fx.admin, 999, &QuizPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, QuizError::NotFound(_)));
    }
}

#[tokio::test]
async fn report_includes_stats() {
    let fx = fixture(Arc::new(MemoryStore::new())).await;
    let quiz = fx.quizzes.create_quiz(&fx.admin, &sample_draft()).await.unwrap();
    let first = quiz.questions[0].id;
    for answer in ["let", "mut"] {
        fx.quizzes
            .submit(
                &Caller::Anonymous,
                quiz.id,
                &SubmitRequest {
                    answers: answers(&[(first, json!(answer))]),
                    name: None,
                },
            )
            .await
            .unwrap();
    }

    let report = fx.quizzes.quiz_report(&fx.admin, quiz.id).await.unwrap();
    assert_eq!(report.quiz.total_points, 25);
    assert_eq!(report.submissions.len(), 2);
    assert_eq!(report.stats.per_question[&first].correct, 1);
    assert_eq!(report.stats.best_percentage, Some(40.0));
}

#[tokio::test]
async fn registration_and_login() {
    for store in backends().await {
        let fx = fixture(store).await;

        let dup_name = fx
            .accounts
            .register(&registration("admin", "student"))
            .await
            .unwrap_err();
        assert!(matches!(dup_name, QuizError::Conflict(m) if m == "Username already exists"));

        let mut dup_email = registration("someone", "student");
        dup_email.email = Some("ADMIN@example.com".into());
        let err = fx.accounts.register(&dup_email).await.unwrap_err();
        assert!(matches!(err, QuizError::Conflict(m) if m == "Email already exists"));

        let by_name = fx
            .accounts
            .login(&LoginRequest {
                username: Some("student".into()),
                password: Some("secret123".into()),
            })
            .await
            .unwrap();
        assert_eq!(by_name.user.role, Role::Student);
        assert_eq!(by_name.access_token, format!("token-{}", by_name.user.id));

        let by_email = fx
            .accounts
            .login(&LoginRequest {
                username: Some("Student@Example.com".into()),
                password: Some("secret123".into()),
            })
            .await
            .unwrap();
        assert_eq!(by_email.user.id, by_name.user.id);

        let wrong = fx
            .accounts
            .login(&LoginRequest {
                username: Some("student".into()),
                password: Some("nope".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, QuizError::InvalidCredentials));

        let me = fx.accounts.current_user(&fx.student).await.unwrap();
        assert_eq!(me.username, "student");
        assert!(matches!(
            fx.accounts.current_user(&Caller::Anonymous).await,
            Err(QuizError::Unauthorized)
        ));
        assert!(matches!(
            fx.accounts.current_user(&Caller::user(999, Role::Student)).await,
            Err(QuizError::NotFound(_))
        ));
    }
}

#[tokio::test]
async fn admin_registration_can_be_disabled() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let accounts =
        AccountService::new(store, Arc::new(PlainCredentials)).with_admin_registration(false);

    let err = accounts
        .register(&registration("root", "admin"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::Forbidden(_)));
    assert!(accounts.register(&registration("pupil", "student")).await.is_ok());
}
