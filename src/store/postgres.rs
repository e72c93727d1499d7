use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    FitnessStore, MealLog, MealType, NewMealLog, NewPoseLog, NewWorkoutLog, NewWorkoutPlan,
    PlanTransition, PlanUpdate, PlanWithWorkout, PoseLog, StoreError, StoreResult, TimeRange, User,
    UserTotals, WorkoutLog, WorkoutPlan, WorkoutTemplate,
};

const PLAN_COLUMNS: &str = r#"
    p.id, p.user_id, p.workout_id, p.date, p.status, p.notes, p.calories_burned,
    p.duration_min, p.body_parts, p.created_at,
    w.id AS w_id, w.title AS w_title, w.kind AS w_kind, w.duration_min AS w_duration_min,
    w.difficulty AS w_difficulty, w.body_parts AS w_body_parts,
    w.calories_per_min AS w_calories_per_min, w.created_at AS w_created_at
"#;

const WORKOUT_LOG_COLUMNS: &str =
    "id, user_id, workout_type, duration_min, calories_burned, intensity, notes, logged_at";
const MEAL_LOG_COLUMNS: &str =
    "id, user_id, food_name, calories, protein_g, carbs_g, fat_g, meal_type, notes, logged_at";
const POSE_LOG_COLUMNS: &str =
    "id, user_id, exercise, accuracy, duration_sec, keypoints, logged_at";
const WORKOUT_COLUMNS: &str =
    "id, title, kind, duration_min, difficulty, body_parts, calories_per_min, created_at";
const BARE_PLAN_COLUMNS: &str = "id, user_id, workout_id, date, status, notes, calories_burned, \
     duration_min, body_parts, created_at";

/// `FitnessStore` over PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn plan_status(&self, id: Uuid) -> StoreResult<Option<String>> {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM workout_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(status)
    }
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    completed_plans: i64,
    plan_calories: f64,
    workout_logs: i64,
    workout_calories: f64,
    meal_logs: i64,
    meal_calories: f64,
    meal_protein_g: f64,
    pose_logs: i64,
    pose_accuracy_sum: f64,
}

impl From<TotalsRow> for UserTotals {
    fn from(r: TotalsRow) -> Self {
        Self {
            completed_plans: r.completed_plans,
            plan_calories: r.plan_calories,
            workout_logs: r.workout_logs,
            workout_calories: r.workout_calories,
            meal_logs: r.meal_logs,
            meal_calories: r.meal_calories,
            meal_protein_g: r.meal_protein_g,
            pose_logs: r.pose_logs,
            pose_accuracy_sum: r.pose_accuracy_sum,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    age: Option<i32>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    goal: String,
    xp: i64,
    role: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            age: r.age,
            height_cm: r.height_cm,
            weight_kg: r.weight_kg,
            goal: r.goal,
            xp: r.xp,
            role: r.role,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct WorkoutRow {
    id: Uuid,
    title: String,
    kind: String,
    duration_min: i32,
    difficulty: String,
    body_parts: Vec<String>,
    calories_per_min: f64,
    created_at: OffsetDateTime,
}

impl From<WorkoutRow> for WorkoutTemplate {
    fn from(r: WorkoutRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            kind: r.kind,
            duration_min: r.duration_min,
            difficulty: r.difficulty,
            body_parts: r.body_parts,
            calories_per_min: r.calories_per_min,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    user_id: Uuid,
    workout_id: Uuid,
    date: OffsetDateTime,
    status: String,
    notes: Option<String>,
    calories_burned: Option<f64>,
    duration_min: Option<i32>,
    body_parts: Vec<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<PlanRow> for WorkoutPlan {
    type Error = StoreError;

    fn try_from(r: PlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            workout_id: r.workout_id,
            date: r.date,
            status: r.status.parse().map_err(StoreError::Corrupt)?,
            notes: r.notes,
            calories_burned: r.calories_burned,
            duration_min: r.duration_min,
            body_parts: r.body_parts,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JoinedPlanRow {
    #[sqlx(flatten)]
    plan: PlanRow,
    w_id: Option<Uuid>,
    w_title: Option<String>,
    w_kind: Option<String>,
    w_duration_min: Option<i32>,
    w_difficulty: Option<String>,
    w_body_parts: Option<Vec<String>>,
    w_calories_per_min: Option<f64>,
    w_created_at: Option<OffsetDateTime>,
}

impl TryFrom<JoinedPlanRow> for PlanWithWorkout {
    type Error = StoreError;

    fn try_from(r: JoinedPlanRow) -> Result<Self, Self::Error> {
        let workout = match (r.w_id, r.w_title, r.w_created_at) {
            (Some(id), Some(title), Some(created_at)) => Some(WorkoutTemplate {
                id,
                title,
                kind: r.w_kind.unwrap_or_default(),
                duration_min: r.w_duration_min.unwrap_or(30),
                difficulty: r.w_difficulty.unwrap_or_default(),
                body_parts: r.w_body_parts.unwrap_or_default(),
                calories_per_min: r.w_calories_per_min.unwrap_or_default(),
                created_at,
            }),
            _ => None,
        };
        Ok(Self {
            plan: r.plan.try_into()?,
            workout,
        })
    }
}

#[derive(Debug, FromRow)]
struct WorkoutLogRow {
    id: Uuid,
    user_id: Uuid,
    workout_type: String,
    duration_min: i32,
    calories_burned: f64,
    intensity: String,
    notes: Option<String>,
    logged_at: OffsetDateTime,
}

impl TryFrom<WorkoutLogRow> for WorkoutLog {
    type Error = StoreError;

    fn try_from(r: WorkoutLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            workout_type: r.workout_type,
            duration_min: r.duration_min,
            calories_burned: r.calories_burned,
            intensity: r.intensity.parse().map_err(StoreError::Corrupt)?,
            notes: r.notes,
            logged_at: r.logged_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MealLogRow {
    id: Uuid,
    user_id: Uuid,
    food_name: String,
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    fat_g: f64,
    meal_type: String,
    notes: Option<String>,
    logged_at: OffsetDateTime,
}

impl TryFrom<MealLogRow> for MealLog {
    type Error = StoreError;

    fn try_from(r: MealLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            food_name: r.food_name,
            calories: r.calories,
            protein_g: r.protein_g,
            carbs_g: r.carbs_g,
            fat_g: r.fat_g,
            meal_type: r.meal_type.parse().map_err(StoreError::Corrupt)?,
            notes: r.notes,
            logged_at: r.logged_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PoseLogRow {
    id: Uuid,
    user_id: Uuid,
    exercise: String,
    accuracy: f64,
    duration_sec: Option<i32>,
    keypoints: Option<serde_json::Value>,
    logged_at: OffsetDateTime,
}

impl From<PoseLogRow> for PoseLog {
    fn from(r: PoseLogRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            exercise: r.exercise,
            accuracy: r.accuracy,
            duration_sec: r.duration_sec,
            keypoints: r.keypoints,
            logged_at: r.logged_at,
        }
    }
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl FitnessStore for PgStore {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, age, height_cm, weight_kg, goal, xp, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn completed_plans(
        &self,
        user_id: Uuid,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> StoreResult<Vec<PlanWithWorkout>> {
        let sql = format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM workout_plans p
            LEFT JOIN workouts w ON w.id = p.workout_id
            WHERE p.user_id = $1
              AND p.status = 'completed'
              AND ($2::timestamptz IS NULL OR p.date >= $2)
            ORDER BY p.date DESC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, JoinedPlanRow>(&sql)
            .bind(user_id)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        collect(rows)
    }

    async fn workout_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        limit: i64,
    ) -> StoreResult<Vec<WorkoutLog>> {
        let sql = format!(
            r#"
            SELECT {WORKOUT_LOG_COLUMNS}
            FROM workout_logs
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR logged_at >= $2)
              AND ($3::timestamptz IS NULL OR logged_at <= $3)
            ORDER BY logged_at DESC
            LIMIT $4
            "#
        );
        let rows = sqlx::query_as::<_, WorkoutLogRow>(&sql)
            .bind(user_id)
            .bind(range.from)
            .bind(range.to)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        collect(rows)
    }

    async fn meal_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        meal_type: Option<MealType>,
        limit: i64,
    ) -> StoreResult<Vec<MealLog>> {
        let sql = format!(
            r#"
            SELECT {MEAL_LOG_COLUMNS}
            FROM meal_logs
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR logged_at >= $2)
              AND ($3::timestamptz IS NULL OR logged_at <= $3)
              AND ($4::text IS NULL OR meal_type = $4)
            ORDER BY logged_at DESC
            LIMIT $5
            "#
        );
        let rows = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(user_id)
            .bind(range.from)
            .bind(range.to)
            .bind(meal_type.map(MealType::as_str))
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        collect(rows)
    }

    async fn pose_logs(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PoseLog>> {
        let sql = format!(
            "SELECT {POSE_LOG_COLUMNS} FROM pose_logs WHERE user_id = $1 \
             ORDER BY logged_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, PoseLogRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(PoseLog::from).collect())
    }

    async fn user_totals(&self, user_id: Uuid) -> StoreResult<UserTotals> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                p.completed_plans, p.plan_calories,
                w.workout_logs, w.workout_calories,
                m.meal_logs, m.meal_calories, m.meal_protein_g,
                s.pose_logs, s.pose_accuracy_sum
            FROM
                (SELECT COUNT(*) AS completed_plans,
                        COALESCE(SUM(calories_burned), 0)::float8 AS plan_calories
                 FROM workout_plans WHERE user_id = $1 AND status = 'completed') p,
                (SELECT COUNT(*) AS workout_logs,
                        COALESCE(SUM(calories_burned), 0)::float8 AS workout_calories
                 FROM workout_logs WHERE user_id = $1) w,
                (SELECT COUNT(*) AS meal_logs,
                        COALESCE(SUM(calories), 0)::float8 AS meal_calories,
                        COALESCE(SUM(protein_g), 0)::float8 AS meal_protein_g
                 FROM meal_logs WHERE user_id = $1) m,
                (SELECT COUNT(*) AS pose_logs,
                        COALESCE(SUM(accuracy), 0)::float8 AS pose_accuracy_sum
                 FROM pose_logs WHERE user_id = $1) s
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn insert_workout_log(&self, log: NewWorkoutLog) -> StoreResult<WorkoutLog> {
        let sql = format!(
            r#"
            INSERT INTO workout_logs
                (user_id, workout_type, duration_min, calories_burned, intensity, notes, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {WORKOUT_LOG_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, WorkoutLogRow>(&sql)
            .bind(log.user_id)
            .bind(&log.workout_type)
            .bind(log.duration_min)
            .bind(log.calories_burned)
            .bind(log.intensity.as_str())
            .bind(&log.notes)
            .bind(log.logged_at)
            .fetch_one(&self.db)
            .await?;
        row.try_into()
    }

    async fn delete_workout_log(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM workout_logs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_meal_log(&self, log: NewMealLog) -> StoreResult<MealLog> {
        let sql = format!(
            r#"
            INSERT INTO meal_logs
                (user_id, food_name, calories, protein_g, carbs_g, fat_g, meal_type, notes, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MEAL_LOG_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MealLogRow>(&sql)
            .bind(log.user_id)
            .bind(&log.food_name)
            .bind(log.calories)
            .bind(log.protein_g)
            .bind(log.carbs_g)
            .bind(log.fat_g)
            .bind(log.meal_type.as_str())
            .bind(&log.notes)
            .bind(log.logged_at)
            .fetch_one(&self.db)
            .await?;
        row.try_into()
    }

    async fn delete_meal_log(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM meal_logs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_pose_log(&self, log: NewPoseLog) -> StoreResult<PoseLog> {
        let sql = format!(
            r#"
            INSERT INTO pose_logs (user_id, exercise, accuracy, duration_sec, keypoints, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {POSE_LOG_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PoseLogRow>(&sql)
            .bind(log.user_id)
            .bind(&log.exercise)
            .bind(log.accuracy)
            .bind(log.duration_sec)
            .bind(&log.keypoints)
            .bind(log.logged_at)
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn list_workouts(&self, limit: i64) -> StoreResult<Vec<WorkoutTemplate>> {
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, WorkoutRow>(&sql)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(WorkoutTemplate::from).collect())
    }

    async fn find_workout(&self, id: Uuid) -> StoreResult<Option<WorkoutTemplate>> {
        let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1");
        let row = sqlx::query_as::<_, WorkoutRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(WorkoutTemplate::from))
    }

    async fn insert_plan(&self, plan: NewWorkoutPlan) -> StoreResult<WorkoutPlan> {
        let sql = format!(
            r#"
            INSERT INTO workout_plans (user_id, workout_id, date, notes, duration_min, body_parts)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BARE_PLAN_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(plan.user_id)
            .bind(plan.workout_id)
            .bind(plan.date)
            .bind(&plan.notes)
            .bind(plan.duration_min)
            .bind(&plan.body_parts)
            .fetch_one(&self.db)
            .await?;
        row.try_into()
    }

    async fn list_plans(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanWithWorkout>> {
        let sql = format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM workout_plans p
            LEFT JOIN workouts w ON w.id = p.workout_id
            WHERE p.user_id = $1
            ORDER BY p.date ASC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, JoinedPlanRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        collect(rows)
    }

    async fn transition_plan(&self, id: Uuid, update: PlanUpdate) -> StoreResult<PlanTransition> {
        // Same rule as PlanStatus::can_become, evaluated by the UPDATE itself.
        let sql = format!(
            r#"
            UPDATE workout_plans
            SET status = $2,
                calories_burned = COALESCE($3, calories_burned),
                duration_min = COALESCE($4, duration_min)
            WHERE id = $1
              AND (status = 'planned' OR status = $2)
            RETURNING {BARE_PLAN_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(id)
            .bind(update.status.as_str())
            .bind(update.calories_burned)
            .bind(update.duration_min)
            .fetch_optional(&self.db)
            .await?;
        if let Some(row) = row {
            return Ok(PlanTransition::Applied(row.try_into()?));
        }

        match self.plan_status(id).await? {
            None => Ok(PlanTransition::Missing),
            Some(raw) => raw
                .parse()
                .map(PlanTransition::Rejected)
                .map_err(StoreError::Corrupt),
        }
    }

    async fn delete_plan(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
