// src/handlers/tests.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::test::{
        ChoiceOption, CreateTestRequest, NewQuestion, PublicTest, Question, Test, UpdateTestRequest,
        validate_questions,
    },
    utils::{
        archive::archive_record,
        codes::{generate_embedded_id, generate_test_code},
        html::clean_html,
    },
};

/// Materializes authored questions, assigning the embedded ids that answer
/// sheets will reference.
fn assign_question_ids(questions: Vec<NewQuestion>) -> Vec<Question> {
    questions
        .into_iter()
        .map(|q| Question {
            id: generate_embedded_id(),
            question_text: q.question_text,
            options: q
                .options
                .into_iter()
                .map(|o| ChoiceOption {
                    id: generate_embedded_id(),
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        })
        .collect()
}

/// Creates a new test with a server-generated code.
///
/// There is no collision retry on the code: a duplicate fails the unique
/// index and surfaces as 409.
pub async fn create_test(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let test_code = generate_test_code();
    let instruction = clean_html(&payload.instruction);
    let questions = assign_question_ids(payload.questions);

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tests (test_code, subject, instruction, questions)
         VALUES (?, ?, ?, ?)
         RETURNING id",
    )
    .bind(&test_code)
    .bind(&payload.subject)
    .bind(&instruction)
    .bind(SqlJson(&questions))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!("Test code '{}' already exists", test_code))
        } else {
            tracing::error!("Failed to create test: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "test_code": test_code })),
    ))
}

/// Lists all tests, including the correct-answer flags.
pub async fn list_tests(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tests = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at
         FROM tests
         ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(tests))
}

/// Retrieves a single test by internal id.
pub async fn get_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at
         FROM tests
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(test))
}

/// Looks up a test by code, case-normalized to uppercase.
/// Returns the examinee view with the correct-answer flags stripped.
pub async fn get_test_by_code(
    State(pool): State<SqlitePool>,
    Path(test_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let test_code = test_code.to_uppercase();

    let test = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at
         FROM tests
         WHERE test_code = ?",
    )
    .bind(&test_code)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(PublicTest::from(test)))
}

/// Updates a test by id. Fields are optional; supplying `questions` replaces
/// the whole question set and re-assigns the embedded ids, which silently
/// invalidates answer sheets referencing the old ones (the grader skips
/// stale references).
pub async fn update_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.subject.is_none() && payload.instruction.is_none() && payload.questions.is_none() {
        return Ok(StatusCode::OK);
    }

    if let Some(questions) = &payload.questions {
        validate_questions(questions).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tests SET ");
    let mut separated = builder.separated(", ");

    if let Some(subject) = payload.subject {
        separated.push("subject = ");
        separated.push_bind_unseparated(subject);
    }

    if let Some(instruction) = payload.instruction {
        separated.push("instruction = ");
        separated.push_bind_unseparated(clean_html(&instruction));
    }

    if let Some(questions) = payload.questions {
        let questions = assign_question_ids(questions);
        let questions_json = serde_json::to_string(&questions)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        separated.push("questions = ");
        separated.push_bind_unseparated(questions_json);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update test: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a test by id, archiving the full document first.
/// Answer sheets referencing it are left in place and skipped by the
/// batch aggregator.
pub async fn delete_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = sqlx::query_as::<_, Test>(
        "SELECT id, test_code, subject, instruction, questions, created_at
         FROM tests
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let payload =
        serde_json::to_value(&test).map_err(|e| AppError::InternalServerError(e.to_string()))?;
    archive_record(&pool, "test", payload).await?;

    sqlx::query("DELETE FROM tests WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Test deleted" })))
}
