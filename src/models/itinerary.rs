use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryItem {
    pub time: String,
    pub activity: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub items: Vec<ItineraryItem>,
}

impl DayPlan {
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|i| i.cost).sum()
    }
}

/// A generated trip plan from the `[ITINERARY_PLAN: ...]` tag. At most one
/// plan is persisted at a time; a new plan overwrites the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub destination: String,
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub budget_total: f64,
    #[serde(default)]
    pub budget_currency: String,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub days_plan: Vec<DayPlan>,
}

impl ItineraryPlan {
    /// Re-numbers days to be 1-based and match their position. The model
    /// usually gets this right, but the stored plan must hold the invariant.
    pub fn reindex_days(&mut self) {
        for (i, day) in self.days_plan.iter_mut().enumerate() {
            day.day = i as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindex_days_fixes_model_numbering() {
        let mut plan: ItineraryPlan = serde_json::from_str(
            r#"{"destination":"Jaipur","days":2,"budget_total":9000,"budget_currency":"INR",
                "days_plan":[{"day":3,"theme":"Forts","items":[]},{"day":3,"theme":"Bazaars","items":[]}]}"#,
        )
        .unwrap();
        plan.reindex_days();
        assert_eq!(plan.days_plan[0].day, 1);
        assert_eq!(plan.days_plan[1].day, 2);
    }

    #[test]
    fn test_day_total_cost() {
        let day: DayPlan = serde_json::from_str(
            r#"{"day":1,"theme":"Heritage","items":[
                {"time":"09:00","activity":"Charminar","cost":25},
                {"time":"13:00","activity":"Lunch","cost":350.5}]}"#,
        )
        .unwrap();
        assert_eq!(day.total_cost(), 375.5);
    }
}
