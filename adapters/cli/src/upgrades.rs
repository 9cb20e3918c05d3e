//! Between-match spending of persistent currency on permanent upgrades.

use anyhow::{Context, Result};
use skirmish_core::{EntityKind, RosterSnapshot};
use skirmish_system_shop::{purchase_upgrade, Shop};
use tracing::info;

/// Buys each hero the cheapest upgrade its owner can afford, one per hero.
///
/// Returns the number of upgrades bought across the roster.
pub(crate) fn buy_upgrades(shop: &Shop, roster: &mut RosterSnapshot) -> Result<usize> {
    let mut bought = 0;
    for profile in &mut roster.profiles {
        for index in 0..profile.heroes.len() {
            if profile.heroes[index].kind() != EntityKind::Hero {
                continue;
            }
            let Some(upgrade) = shop
                .upgrade_offers(profile.currency)
                .min_by_key(|upgrade| upgrade.cost)
                .cloned()
            else {
                break;
            };
            let remaining = purchase_upgrade(profile, index, &upgrade).with_context(|| {
                format!("{} could not buy {}", profile.name, upgrade.name)
            })?;
            info!(
                player = %profile.name,
                hero = %profile.heroes[index].name,
                upgrade = %upgrade.name,
                remaining,
                "upgrade bought"
            );
            bought += 1;
        }
    }
    Ok(bought)
}
