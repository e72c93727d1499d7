use std::cmp::Reverse;

use async_trait::async_trait;
use time::{macros::datetime, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    FitnessStore, MealLog, MealType, NewMealLog, NewPoseLog, NewWorkoutLog, NewWorkoutPlan,
    PlanStatus, PlanTransition, PlanUpdate, PlanWithWorkout, PoseLog, StoreResult, TimeRange, User,
    UserTotals, WorkoutLog, WorkoutPlan, WorkoutTemplate,
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    workouts: Vec<WorkoutTemplate>,
    plans: Vec<WorkoutPlan>,
    workout_logs: Vec<WorkoutLog>,
    meal_logs: Vec<MealLog>,
    pose_logs: Vec<PoseLog>,
}

/// In-process `FitnessStore`. Nothing is persisted across restarts.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

fn cap(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

/// Fixed id of the user `MemoryStore::with_demo_data` creates.
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

/// Same templates as `migrations/0002_seed_workouts.sql`.
const SEED_WORKOUTS: [(&str, &str, i32, &str, &[&str], f64); 7] = [
    ("Leg Day Strength", "strength", 45, "medium", &["legs", "lowerbody", "glutes"], 6.0),
    ("Upper Body Push", "strength", 40, "medium", &["chest", "shoulders", "upperbody"], 5.0),
    ("Back and Biceps Pull", "strength", 40, "medium", &["back", "arms", "upperbody"], 5.0),
    ("Core Crusher", "strength", 20, "easy", &["abs", "abdomen"], 4.0),
    ("HIIT Burn", "hiit", 25, "hard", &[], 12.0),
    ("Morning Mobility Flow", "mobility", 15, "easy", &[], 3.0),
    ("Steady State Run", "cardio", 30, "medium", &["cardio"], 10.0),
];

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one demo user and the seeded workout templates, so a
    /// memory-backed server can be exercised end to end.
    pub fn with_demo_data() -> Self {
        let created_at = datetime!(2024-01-01 00:00 UTC);
        let users = vec![User {
            id: DEMO_USER_ID,
            name: Some("Demo User".into()),
            email: "demo@aurafit.local".into(),
            age: None,
            height_cm: None,
            weight_kg: None,
            goal: "General Fitness".into(),
            xp: 0,
            role: "user".into(),
            created_at,
        }];
        let workouts = SEED_WORKOUTS
            .iter()
            .map(|&(title, kind, duration_min, difficulty, parts, per_min)| WorkoutTemplate {
                id: Uuid::new_v4(),
                title: title.into(),
                kind: kind.into(),
                duration_min,
                difficulty: difficulty.into(),
                body_parts: parts.iter().map(|p| (*p).to_owned()).collect(),
                calories_per_min: per_min,
                created_at,
            })
            .collect();
        Self {
            inner: RwLock::new(Collections {
                users,
                workouts,
                ..Default::default()
            }),
        }
    }

    #[cfg(test)]
    pub async fn insert_user(&self, user: User) {
        self.inner.write().await.users.push(user);
    }

    #[cfg(test)]
    pub async fn insert_workout(&self, workout: WorkoutTemplate) {
        self.inner.write().await.workouts.push(workout);
    }

    /// Stores a plan as-is, status included.
    #[cfg(test)]
    pub async fn put_plan(&self, plan: WorkoutPlan) {
        self.inner.write().await.plans.push(plan);
    }

    fn join(c: &Collections, plan: &WorkoutPlan) -> PlanWithWorkout {
        PlanWithWorkout {
            plan: plan.clone(),
            workout: c.workouts.iter().find(|w| w.id == plan.workout_id).cloned(),
        }
    }
}

#[async_trait]
impl FitnessStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let c = self.inner.read().await;
        Ok(c.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn completed_plans(
        &self,
        user_id: Uuid,
        since: Option<OffsetDateTime>,
        limit: i64,
    ) -> StoreResult<Vec<PlanWithWorkout>> {
        let c = self.inner.read().await;
        let mut plans: Vec<&WorkoutPlan> = c
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && p.status == PlanStatus::Completed)
            .filter(|p| since.map_or(true, |s| p.date >= s))
            .collect();
        plans.sort_by_key(|p| Reverse(p.date));
        Ok(plans
            .into_iter()
            .take(cap(limit))
            .map(|p| Self::join(&c, p))
            .collect())
    }

    async fn workout_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        limit: i64,
    ) -> StoreResult<Vec<WorkoutLog>> {
        let c = self.inner.read().await;
        let mut logs: Vec<WorkoutLog> = c
            .workout_logs
            .iter()
            .filter(|l| l.user_id == user_id && range.contains(l.logged_at))
            .cloned()
            .collect();
        logs.sort_by_key(|l| Reverse(l.logged_at));
        logs.truncate(cap(limit));
        Ok(logs)
    }

    async fn meal_logs(
        &self,
        user_id: Uuid,
        range: TimeRange,
        meal_type: Option<MealType>,
        limit: i64,
    ) -> StoreResult<Vec<MealLog>> {
        let c = self.inner.read().await;
        let mut logs: Vec<MealLog> = c
            .meal_logs
            .iter()
            .filter(|l| l.user_id == user_id && range.contains(l.logged_at))
            .filter(|l| meal_type.map_or(true, |t| l.meal_type == t))
            .cloned()
            .collect();
        logs.sort_by_key(|l| Reverse(l.logged_at));
        logs.truncate(cap(limit));
        Ok(logs)
    }

    async fn pose_logs(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PoseLog>> {
        let c = self.inner.read().await;
        let mut logs: Vec<PoseLog> = c
            .pose_logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| Reverse(l.logged_at));
        logs.truncate(cap(limit));
        Ok(logs)
    }

    async fn user_totals(&self, user_id: Uuid) -> StoreResult<UserTotals> {
        let c = self.inner.read().await;
        let mut totals = UserTotals::default();
        for p in c
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && p.status == PlanStatus::Completed)
        {
            totals.completed_plans += 1;
            totals.plan_calories += p.calories_burned.unwrap_or(0.0);
        }
        for l in c.workout_logs.iter().filter(|l| l.user_id == user_id) {
            totals.workout_logs += 1;
            totals.workout_calories += l.calories_burned;
        }
        for m in c.meal_logs.iter().filter(|m| m.user_id == user_id) {
            totals.meal_logs += 1;
            totals.meal_calories += m.calories;
            totals.meal_protein_g += m.protein_g;
        }
        for p in c.pose_logs.iter().filter(|p| p.user_id == user_id) {
            totals.pose_logs += 1;
            totals.pose_accuracy_sum += p.accuracy;
        }
        Ok(totals)
    }

    async fn insert_workout_log(&self, log: NewWorkoutLog) -> StoreResult<WorkoutLog> {
        let row = WorkoutLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            workout_type: log.workout_type,
            duration_min: log.duration_min,
            calories_burned: log.calories_burned,
            intensity: log.intensity,
            notes: log.notes,
            logged_at: log.logged_at,
        };
        self.inner.write().await.workout_logs.push(row.clone());
        Ok(row)
    }

    async fn delete_workout_log(&self, id: Uuid) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let before = c.workout_logs.len();
        c.workout_logs.retain(|l| l.id != id);
        Ok(c.workout_logs.len() != before)
    }

    async fn insert_meal_log(&self, log: NewMealLog) -> StoreResult<MealLog> {
        let row = MealLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            food_name: log.food_name,
            calories: log.calories,
            protein_g: log.protein_g,
            carbs_g: log.carbs_g,
            fat_g: log.fat_g,
            meal_type: log.meal_type,
            notes: log.notes,
            logged_at: log.logged_at,
        };
        self.inner.write().await.meal_logs.push(row.clone());
        Ok(row)
    }

    async fn delete_meal_log(&self, id: Uuid) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let before = c.meal_logs.len();
        c.meal_logs.retain(|l| l.id != id);
        Ok(c.meal_logs.len() != before)
    }

    async fn insert_pose_log(&self, log: NewPoseLog) -> StoreResult<PoseLog> {
        let row = PoseLog {
            id: Uuid::new_v4(),
            user_id: log.user_id,
            exercise: log.exercise,
            accuracy: log.accuracy,
            duration_sec: log.duration_sec,
            keypoints: log.keypoints,
            logged_at: log.logged_at,
        };
        self.inner.write().await.pose_logs.push(row.clone());
        Ok(row)
    }

    async fn list_workouts(&self, limit: i64) -> StoreResult<Vec<WorkoutTemplate>> {
        let c = self.inner.read().await;
        let mut workouts = c.workouts.clone();
        workouts.sort_by_key(|w| Reverse(w.created_at));
        workouts.truncate(cap(limit));
        Ok(workouts)
    }

    async fn find_workout(&self, id: Uuid) -> StoreResult<Option<WorkoutTemplate>> {
        let c = self.inner.read().await;
        Ok(c.workouts.iter().find(|w| w.id == id).cloned())
    }

    async fn insert_plan(&self, plan: NewWorkoutPlan) -> StoreResult<WorkoutPlan> {
        let row = WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: plan.user_id,
            workout_id: plan.workout_id,
            date: plan.date,
            status: PlanStatus::Planned,
            notes: plan.notes,
            calories_burned: None,
            duration_min: plan.duration_min,
            body_parts: plan.body_parts,
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.write().await.plans.push(row.clone());
        Ok(row)
    }

    async fn list_plans(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanWithWorkout>> {
        let c = self.inner.read().await;
        let mut plans: Vec<&WorkoutPlan> = c.plans.iter().filter(|p| p.user_id == user_id).collect();
        plans.sort_by_key(|p| p.date);
        Ok(plans
            .into_iter()
            .take(cap(limit))
            .map(|p| Self::join(&c, p))
            .collect())
    }

    async fn transition_plan(&self, id: Uuid, update: PlanUpdate) -> StoreResult<PlanTransition> {
        let mut c = self.inner.write().await;
        let Some(plan) = c.plans.iter_mut().find(|p| p.id == id) else {
            return Ok(PlanTransition::Missing);
        };
        if !plan.status.can_become(update.status) {
            return Ok(PlanTransition::Rejected(plan.status));
        }
        plan.status = update.status;
        if update.calories_burned.is_some() {
            plan.calories_burned = update.calories_burned;
        }
        if update.duration_min.is_some() {
            plan.duration_min = update.duration_min;
        }
        Ok(PlanTransition::Applied(plan.clone()))
    }

    async fn delete_plan(&self, id: Uuid) -> StoreResult<bool> {
        let mut c = self.inner.write().await;
        let before = c.plans.len();
        c.plans.retain(|p| p.id != id);
        Ok(c.plans.len() != before)
    }
}
