//! Static donation campaign catalog.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// A charitable campaign that km can be donated to.
///
/// The catalog is static display data; donations reference campaigns by ID
/// but are not reconciled against `current_km` here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: u32,
    pub title: &'static str,
    pub organization: &'static str,
    pub goal_km: Decimal,
    pub current_km: Decimal,
    pub image: &'static str,
    pub description: &'static str,
}

/// The campaign catalog shown in the app.
pub fn catalog() -> Vec<Campaign> {
    vec![
        Campaign {
            id: 1,
            title: "Good Neighbors Running Campaign",
            organization: "Good Neighbors",
            goal_km: dec!(100),
            current_km: dec!(72.5),
            image: "https://cdn.pixabay.com/photo/2016/03/09/15/10/runners-1246610_1280.jpg",
            description: "Running donations supporting children in vulnerable communities.",
        },
        Campaign {
            id: 2,
            title: "HeartSave Marathon",
            organization: "HeartSave Foundation",
            goal_km: dec!(200),
            current_km: dec!(185.3),
            image: "https://cdn.pixabay.com/photo/2019/05/06/16/32/run-4189082_1280.jpg",
            description: "Running donations supporting patients with heart disease.",
        },
        Campaign {
            id: 3,
            title: "Running for Peace",
            organization: "UN Peace Foundation",
            goal_km: dec!(300),
            current_km: dec!(90.1),
            image: "https://cdn.pixabay.com/photo/2016/09/05/09/32/people-1647321_1280.jpg",
            description: "A peace campaign helping children in regions affected by war.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let campaigns = catalog();
        assert_eq!(campaigns.len(), 3);

        let mut ids: Vec<u32> = campaigns.iter().map(|c| c.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), campaigns.len());
    }
}
