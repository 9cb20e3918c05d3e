#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure shop system that prices runes and upgrades and emits the resulting commands.
//!
//! Runes are bought with battle currency during a match and turn into
//! [`Command::ApplyModifier`] requests. Upgrades are bought between matches with
//! persistent currency and are recorded directly on a roster profile.

use serde::{Deserialize, Serialize};
use skirmish_core::{
    Command, EntityKind, EntitySnapshot, Modifier, ModifierScope, PlayerProfile, PurchaseError,
};

/// Records the shop offers, split by scope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopCatalog {
    /// Battle-scoped modifiers sold during a match.
    #[serde(default)]
    pub runes: Vec<Modifier>,
    /// Permanent modifiers sold between matches.
    #[serde(default)]
    pub upgrades: Vec<Modifier>,
}

impl ShopCatalog {
    /// Catalog used when no custom one is supplied.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            runes: vec![
                Modifier {
                    attack: 1.25,
                    ..Modifier::rune("Rune of Fury", 10)
                },
                Modifier {
                    defense: 1.5,
                    crit_resistance: 200,
                    ..Modifier::rune("Rune of Stone", 100)
                },
                Modifier {
                    crit_rate: 900,
                    crit_damage: 0.5,
                    ..Modifier::rune("Rune of Precision", 1_000)
                },
                Modifier {
                    health: 1.5,
                    magic: 1.5,
                    ..Modifier::rune("Rune of Vigor", 10_000)
                },
            ],
            upgrades: vec![
                Modifier {
                    health: 1.1,
                    ..Modifier::upgrade("Tempered Armor", 10)
                },
                Modifier {
                    attack: 1.1,
                    ..Modifier::upgrade("Honed Blade", 10)
                },
                Modifier {
                    crit_rate: 150,
                    ..Modifier::upgrade("Keen Eye", 100)
                },
            ],
        }
    }
}

/// Successful rune purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    /// Command that stacks the rune onto the buyer.
    pub command: Command,
    /// Price paid.
    pub cost: u64,
    /// Currency left after paying.
    pub remaining: u64,
}

/// Shop system that validates purchases against a catalog.
#[derive(Clone, Debug, Default)]
pub struct Shop {
    catalog: ShopCatalog,
}

impl Shop {
    /// Creates a shop selling the provided catalog.
    #[must_use]
    pub fn new(catalog: ShopCatalog) -> Self {
        Self { catalog }
    }

    /// Runes that cost at most `available`, in catalog order.
    pub fn offers(&self, available: u64) -> impl Iterator<Item = &Modifier> {
        self.catalog
            .runes
            .iter()
            .filter(move |rune| rune.cost <= available)
    }

    /// Upgrades that cost at most `available`, in catalog order.
    pub fn upgrade_offers(&self, available: u64) -> impl Iterator<Item = &Modifier> {
        self.catalog
            .upgrades
            .iter()
            .filter(move |upgrade| upgrade.cost <= available)
    }

    /// Looks up a rune by name.
    #[must_use]
    pub fn rune(&self, name: &str) -> Option<&Modifier> {
        self.catalog.runes.iter().find(|rune| rune.name == name)
    }

    /// Prices `record` for `buyer` and emits the command that applies it.
    pub fn purchase(
        &self,
        buyer: &EntitySnapshot,
        record: &Modifier,
        available: u64,
    ) -> Result<Purchase, PurchaseError> {
        if record.scope != ModifierScope::Rune {
            return Err(PurchaseError::WrongScope);
        }
        if buyer.kind != EntityKind::Hero {
            return Err(PurchaseError::NotAHero);
        }
        if !buyer.is_alive() {
            return Err(PurchaseError::Defeated);
        }
        let remaining = available
            .checked_sub(record.cost)
            .ok_or(PurchaseError::Unaffordable {
                cost: record.cost,
                available,
            })?;

        Ok(Purchase {
            command: Command::ApplyModifier {
                entity: buyer.id,
                modifier: record.clone(),
            },
            cost: record.cost,
            remaining,
        })
    }
}

/// Spends persistent currency on a permanent upgrade for one of the profile's heroes.
///
/// Returns the currency left on the profile.
pub fn purchase_upgrade(
    profile: &mut PlayerProfile,
    hero_index: usize,
    record: &Modifier,
) -> Result<u64, PurchaseError> {
    if record.scope != ModifierScope::Upgrade {
        return Err(PurchaseError::WrongScope);
    }
    let available = profile.currency;
    let hero = profile
        .heroes
        .get_mut(hero_index)
        .ok_or(PurchaseError::UnknownHero)?;
    if hero.kind() != EntityKind::Hero {
        return Err(PurchaseError::NotAHero);
    }
    let remaining = available
        .checked_sub(record.cost)
        .ok_or(PurchaseError::Unaffordable {
            cost: record.cost,
            available,
        })?;

    hero.upgrades.push(record.clone());
    profile.currency = remaining;
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{presets, EffectiveStats, EntityId, TeamId};

    fn snapshot(kind: EntityKind, health: u64) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(3),
            name: "Buyer".to_owned(),
            team: TeamId::One,
            kind,
            position: None,
            health,
            magic: 0,
            stats: EffectiveStats {
                max_health: 100,
                max_magic: 0,
                attack: 10,
                defense: 0,
                crit_rate: 0,
                crit_resistance: 0,
                crit_damage: 1.0,
            },
            level: 1,
            experience: 0,
            required_experience: 10,
            has_moved: false,
            has_attacked: false,
            kills: 0,
            deaths: 0,
            movement: Some(3),
            skills: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    #[test]
    fn offers_filter_by_price() {
        let shop = Shop::new(ShopCatalog::standard());
        let names: Vec<_> = shop.offers(100).map(|rune| rune.name.as_str()).collect();
        assert_eq!(names, vec!["Rune of Fury", "Rune of Stone"]);
        assert_eq!(shop.offers(0).count(), 0);
    }

    #[test]
    fn purchase_emits_apply_command_and_remaining_currency() {
        let shop = Shop::new(ShopCatalog::standard());
        let rune = shop.rune("Rune of Fury").cloned().expect("stock rune");
        let purchase = shop
            .purchase(&snapshot(EntityKind::Hero, 50), &rune, 25)
            .expect("affordable");
        assert_eq!(purchase.remaining, 15);
        assert_eq!(purchase.cost, 10);
        assert_eq!(
            purchase.command,
            Command::ApplyModifier {
                entity: EntityId::new(3),
                modifier: rune,
            }
        );
    }

    #[test]
    fn purchase_rejections() {
        let shop = Shop::new(ShopCatalog::standard());
        let rune = shop.rune("Rune of Stone").cloned().expect("stock rune");
        let hero = snapshot(EntityKind::Hero, 50);

        assert_eq!(
            shop.purchase(&hero, &rune, 99),
            Err(PurchaseError::Unaffordable {
                cost: 100,
                available: 99
            })
        );
        assert_eq!(
            shop.purchase(&snapshot(EntityKind::Villager, 50), &rune, 500),
            Err(PurchaseError::NotAHero)
        );
        assert_eq!(
            shop.purchase(&snapshot(EntityKind::Hero, 0), &rune, 500),
            Err(PurchaseError::Defeated)
        );
        let upgrade = ShopCatalog::standard().upgrades[0].clone();
        assert_eq!(
            shop.purchase(&hero, &upgrade, 500),
            Err(PurchaseError::WrongScope)
        );
    }

    #[test]
    fn upgrades_are_recorded_on_the_profile() {
        let mut profile = PlayerProfile {
            name: "Quinn".to_owned(),
            currency: 15,
            rank: 0,
            heroes: vec![presets::hero("Aria"), presets::hero("Bram")],
        };
        let shop = Shop::new(ShopCatalog::standard());
        let upgrade = shop
            .upgrade_offers(profile.currency)
            .next()
            .cloned()
            .expect("cheap upgrade");

        assert_eq!(purchase_upgrade(&mut profile, 1, &upgrade), Ok(5));
        assert_eq!(profile.currency, 5);
        assert_eq!(profile.heroes[1].upgrades, vec![upgrade.clone()]);
        assert!(profile.heroes[0].upgrades.is_empty());

        assert_eq!(
            purchase_upgrade(&mut profile, 0, &upgrade),
            Err(PurchaseError::Unaffordable {
                cost: 10,
                available: 5
            })
        );
        assert_eq!(
            purchase_upgrade(&mut profile, 7, &upgrade),
            Err(PurchaseError::UnknownHero)
        );
        let rune = Modifier::rune("Loose Rune", 0);
        assert_eq!(
            purchase_upgrade(&mut profile, 0, &rune),
            Err(PurchaseError::WrongScope)
        );
    }

    #[test]
    fn catalog_fields_default_when_omitted() {
        let catalog: ShopCatalog = toml::from_str(
            r#"
            [[runes]]
            name = "Rune of Haste"
            scope = "Rune"
            cost = 5
            attack = 1.5
            "#,
        )
        .expect("catalog parses");
        assert!(catalog.upgrades.is_empty());
        let rune = &catalog.runes[0];
        assert!((rune.health - 1.0).abs() < f64::EPSILON);
        assert!((rune.attack - 1.5).abs() < f64::EPSILON);
        assert_eq!(rune.crit_rate, 0);
    }
}
