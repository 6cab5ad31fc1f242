// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of QEnergia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use qenergia_types::Kit;

use crate::catalog::Catalog;

/// Pick the cheapest kit whose production covers `required_generation_kwh`.
///
/// `None` means no single kit is large enough; callers fall back to a
/// custom quote. Equal prices resolve to the earlier catalog entry.
#[must_use]
pub fn select_best_kit(catalog: &Catalog, required_generation_kwh: u32) -> Option<&Kit> {
    catalog
        .iter()
        .filter(|kit| kit.estimated_production_kwh >= required_generation_kwh)
        .min_by(|a, b| a.price.total_cmp(&b.price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kit(id: u32, production: u32, price: f64) -> Kit {
        Kit {
            id,
            name: format!("Kit {id}"),
            modules: 10,
            power_per_module_kwp: 0.55,
            total_power_kwp: 5.5,
            inverters: 1,
            micro_inverters: None,
            area_required_m2: 28.0,
            structure_type: "Estrutura metálica".to_owned(),
            estimated_production_kwh: production,
            price,
        }
    }

    #[test]
    fn test_selects_smallest_sufficient_standard_kit() {
        let catalog = Catalog::standard();
        let kit = select_best_kit(&catalog, 563).unwrap();
        assert_eq!(kit.name, "Kit Residencial Plus");

        assert_eq!(select_best_kit(&catalog, 620).unwrap().id, 1);
        assert_eq!(select_best_kit(&catalog, 621).unwrap().id, 2);
        assert_eq!(select_best_kit(&catalog, 11625).unwrap().id, 10);
    }

    #[test]
    fn test_no_kit_large_enough() {
        let catalog = Catalog::standard();
        assert!(select_best_kit(&catalog, 125_000).is_none());
        assert!(select_best_kit(&catalog, 11626).is_none());
    }

    #[test]
    fn test_cheapest_wins_regardless_of_order() {
        let catalog = Catalog::new(vec![
            kit(1, 1000, 30000.0),
            kit(2, 2000, 20000.0),
            kit(3, 500, 5000.0),
        ])
        .unwrap();
        assert_eq!(select_best_kit(&catalog, 900).unwrap().id, 2);
    }

    #[test]
    fn test_ties_resolve_to_first_entry() {
        let catalog = Catalog::new(vec![
            kit(7, 1000, 20000.0),
            kit(8, 1200, 20000.0),
            kit(9, 1500, 20000.0),
        ])
        .unwrap();
        assert_eq!(select_best_kit(&catalog, 900).unwrap().id, 7);
        assert_eq!(select_best_kit(&catalog, 1100).unwrap().id, 8);
    }
}
