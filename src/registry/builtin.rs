//! Built-in card definitions
//!
//! A small, fixed card pool covering every ability shape the engine
//! understands. Extra cards can be loaded from JSON on top of it.

use crate::core::{
    Ability, AbilityCost, ActivatedAbility, CardDefinition, CardType, Color, Effect, EffectTarget, Filter, Keyword,
    ManaCost, ObjectClass, Predicate, ReplacementEffect, StaticAbility, TargetController, TargetKind, TargetSpec,
    TriggerEvent, TriggerSubject, TriggeredAbility,
};

/// Cost strings in this table are literals, checked by the tests below
fn cost(s: &str) -> ManaCost {
    ManaCost::from_string(s).unwrap_or_default()
}

fn tap_for(color: Color) -> Ability {
    Ability::Activated(ActivatedAbility {
        cost: AbilityCost {
            tap: true,
            mana: ManaCost::new(),
        },
        effects: vec![Effect::AddMana {
            mana: ManaCost::of(color, 1),
        }],
        target: None,
        description: format!("add {{{color}}}"),
    })
}

fn tap_for_many(color: Color, amount: u8) -> Ability {
    Ability::Activated(ActivatedAbility {
        cost: AbilityCost {
            tap: true,
            mana: ManaCost::new(),
        },
        effects: vec![Effect::AddMana {
            mana: ManaCost::of(color, amount),
        }],
        target: None,
        description: format!("add {amount} {{{color}}}"),
    })
}

fn triggered(
    event: TriggerEvent,
    subject: TriggerSubject,
    target: Option<TargetSpec>,
    effects: Vec<Effect>,
    description: &str,
) -> Ability {
    Ability::Triggered(TriggeredAbility {
        event,
        subject,
        effects,
        target,
        optional: false,
        description: description.to_string(),
    })
}

fn any_target() -> TargetSpec {
    TargetSpec::exactly_one(TargetKind::Any(Filter::creature()))
}

fn target_creature() -> TargetSpec {
    TargetSpec::exactly_one(TargetKind::Permanent(Filter::creature()))
}

fn target_player() -> TargetSpec {
    TargetSpec::exactly_one(TargetKind::Player(TargetController::Any))
}

fn basic_land(name: &str, subtype: &str, color: Color) -> CardDefinition {
    CardDefinition::new(name, &[CardType::Land])
        .with_subtypes(&[subtype])
        .with_ability(tap_for(color))
        .with_text(format!("{{T}}: Add {{{color}}}."))
}

fn creature(name: &str, mana: &str, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::new(name, &[CardType::Creature])
        .with_cost(cost(mana))
        .with_pt(power, toughness)
}

fn instant(name: &str, mana: &str, target: Option<TargetSpec>, effects: Vec<Effect>, text: &str) -> CardDefinition {
    CardDefinition::new(name, &[CardType::Instant])
        .with_cost(cost(mana))
        .with_spell(target, effects)
        .with_text(text)
}

fn sorcery(name: &str, mana: &str, target: Option<TargetSpec>, effects: Vec<Effect>, text: &str) -> CardDefinition {
    CardDefinition::new(name, &[CardType::Sorcery])
        .with_cost(cost(mana))
        .with_spell(target, effects)
        .with_text(text)
}

fn lands() -> Vec<CardDefinition> {
    vec![
        basic_land("Plains", "Plains", Color::White),
        basic_land("Island", "Island", Color::Blue),
        basic_land("Swamp", "Swamp", Color::Black),
        basic_land("Mountain", "Mountain", Color::Red),
        basic_land("Forest", "Forest", Color::Green),
        CardDefinition::new("Selesnya Guildgate", &[CardType::Land])
            .with_subtypes(&["Gate"])
            .with_ability(Ability::Replacement(ReplacementEffect::EntersTapped))
            .with_ability(tap_for(Color::Green))
            .with_ability(tap_for(Color::White))
            .with_text("Selesnya Guildgate enters the battlefield tapped. {T}: Add {G} or {W}."),
        CardDefinition::new("Izzet Guildgate", &[CardType::Land])
            .with_subtypes(&["Gate"])
            .with_ability(Ability::Replacement(ReplacementEffect::EntersTapped))
            .with_ability(tap_for(Color::Blue))
            .with_ability(tap_for(Color::Red))
            .with_text("Izzet Guildgate enters the battlefield tapped. {T}: Add {U} or {R}."),
    ]
}

fn artifacts() -> Vec<CardDefinition> {
    vec![
        CardDefinition::new("Sol Ring", &[CardType::Artifact])
            .with_cost(cost("1"))
            .with_ability(tap_for_many(Color::Colorless, 2))
            .with_text("{T}: Add {C}{C}."),
        CardDefinition::new("Mind Stone", &[CardType::Artifact])
            .with_cost(cost("2"))
            .with_ability(tap_for(Color::Colorless))
            .with_text("{T}: Add {C}."),
        CardDefinition::new("Ornithopter", &[CardType::Artifact, CardType::Creature])
            .with_subtypes(&["Thopter"])
            .with_pt(0, 2)
            .with_keywords(&[Keyword::Flying])
            .with_text("Flying"),
        CardDefinition::new("Perilous Myr", &[CardType::Artifact, CardType::Creature])
            .with_cost(cost("2"))
            .with_subtypes(&["Myr"])
            .with_pt(1, 1)
            .with_ability(triggered(
                TriggerEvent::Dies,
                TriggerSubject::This,
                Some(any_target()),
                vec![Effect::DealDamage {
                    target: EffectTarget::Targets,
                    amount: 2,
                }],
                "Perilous Myr deals 2 damage to any target",
            ))
            .with_text("When Perilous Myr dies, it deals 2 damage to any target."),
    ]
}

fn creatures() -> Vec<CardDefinition> {
    vec![
        creature("Grizzly Bears", "1G", 2, 2).with_subtypes(&["Bear"]),
        creature("Savannah Lions", "W", 2, 1).with_subtypes(&["Cat"]),
        creature("Hill Giant", "3R", 3, 3).with_subtypes(&["Giant"]),
        creature("Craw Wurm", "4GG", 6, 4).with_subtypes(&["Wurm"]),
        creature("Raging Goblin", "R", 1, 1)
            .with_subtypes(&["Goblin", "Berserker"])
            .with_keywords(&[Keyword::Haste])
            .with_text("Haste"),
        creature("Serra Angel", "3WW", 4, 4)
            .with_subtypes(&["Angel"])
            .with_keywords(&[Keyword::Flying, Keyword::Vigilance])
            .with_text("Flying, vigilance"),
        creature("Air Elemental", "3UU", 4, 4)
            .with_subtypes(&["Elemental"])
            .with_keywords(&[Keyword::Flying])
            .with_text("Flying"),
        creature("Giant Spider", "3G", 2, 4)
            .with_subtypes(&["Spider"])
            .with_keywords(&[Keyword::Reach])
            .with_text("Reach"),
        creature("Wall of Stone", "1RR", 0, 8)
            .with_subtypes(&["Wall"])
            .with_keywords(&[Keyword::Defender])
            .with_text("Defender"),
        creature("Typhoid Rats", "B", 1, 1)
            .with_subtypes(&["Rat"])
            .with_keywords(&[Keyword::Deathtouch])
            .with_text("Deathtouch"),
        creature("Vampire Nighthawk", "1BB", 2, 3)
            .with_subtypes(&["Vampire", "Shaman"])
            .with_keywords(&[Keyword::Flying, Keyword::Deathtouch, Keyword::Lifelink])
            .with_text("Flying, deathtouch, lifelink"),
        creature("Llanowar Elves", "G", 1, 1)
            .with_subtypes(&["Elf", "Druid"])
            .with_ability(tap_for(Color::Green))
            .with_text("{T}: Add {G}."),
        creature("Lumengrid Sentinel", "2U", 1, 2)
            .with_subtypes(&["Human", "Wizard"])
            .with_keywords(&[Keyword::Flying])
            .with_ability(Ability::Triggered(TriggeredAbility {
                event: TriggerEvent::EntersBattlefield,
                subject: TriggerSubject::Object(
                    Filter::new("an artifact", ObjectClass::Artifact)
                        .with(Predicate::ControlledBy(TargetController::You)),
                ),
                effects: vec![Effect::Tap {
                    target: EffectTarget::Targets,
                }],
                target: Some(TargetSpec::exactly_one(TargetKind::Permanent(Filter::permanent()))),
                optional: true,
                description: "you may tap target permanent".to_string(),
            }))
            .with_text(
                "Flying. Whenever an artifact enters the battlefield under your control, \
                 you may tap target permanent.",
            ),
        creature("Elvish Visionary", "1G", 1, 1)
            .with_subtypes(&["Elf", "Shaman"])
            .with_ability(triggered(
                TriggerEvent::EntersBattlefield,
                TriggerSubject::This,
                None,
                vec![Effect::DrawCards {
                    target: EffectTarget::Controller,
                    count: 1,
                }],
                "draw a card",
            ))
            .with_text("When Elvish Visionary enters the battlefield, draw a card."),
        creature("Man-o'-War", "2U", 2, 2)
            .with_subtypes(&["Jellyfish"])
            .with_ability(triggered(
                TriggerEvent::EntersBattlefield,
                TriggerSubject::This,
                Some(target_creature()),
                vec![Effect::ReturnToHand {
                    target: EffectTarget::Targets,
                }],
                "return target creature to its owner's hand",
            ))
            .with_text("When Man-o'-War enters the battlefield, return target creature to its owner's hand."),
        creature("Sparkmage Apprentice", "1R", 1, 1)
            .with_subtypes(&["Human", "Wizard"])
            .with_ability(triggered(
                TriggerEvent::EntersBattlefield,
                TriggerSubject::This,
                Some(any_target()),
                vec![Effect::DealDamage {
                    target: EffectTarget::Targets,
                    amount: 1,
                }],
                "Sparkmage Apprentice deals 1 damage to any target",
            ))
            .with_text("When Sparkmage Apprentice enters the battlefield, it deals 1 damage to any target."),
        creature("Soul Warden", "W", 1, 1)
            .with_subtypes(&["Human", "Cleric"])
            .with_ability(triggered(
                TriggerEvent::EntersBattlefield,
                TriggerSubject::Object(Filter::creature().with(Predicate::Another)),
                None,
                vec![Effect::GainLife {
                    target: EffectTarget::Controller,
                    amount: 1,
                }],
                "you gain 1 life",
            ))
            .with_text("Whenever another creature enters the battlefield, you gain 1 life."),
        creature("Marauding Blight-Priest", "2B", 3, 2)
            .with_subtypes(&["Vampire", "Cleric"])
            .with_ability(triggered(
                TriggerEvent::LifeGained,
                TriggerSubject::Player(TargetController::You),
                None,
                vec![Effect::LoseLife {
                    target: EffectTarget::EachOpponent,
                    amount: 1,
                }],
                "each opponent loses 1 life",
            ))
            .with_text("Whenever you gain life, each opponent loses 1 life."),
        creature("Goblin Guide", "R", 2, 2)
            .with_subtypes(&["Goblin", "Scout"])
            .with_keywords(&[Keyword::Haste])
            .with_ability(triggered(
                TriggerEvent::Attacks,
                TriggerSubject::This,
                None,
                vec![Effect::DrawCards {
                    target: EffectTarget::EachOpponent,
                    count: 1,
                }],
                "each opponent draws a card",
            ))
            .with_text("Haste. Whenever Goblin Guide attacks, each opponent draws a card."),
        creature("Prodigal Pyromancer", "2R", 1, 1)
            .with_subtypes(&["Human", "Wizard"])
            .with_ability(Ability::Activated(ActivatedAbility {
                cost: AbilityCost {
                    tap: true,
                    mana: ManaCost::new(),
                },
                effects: vec![Effect::DealDamage {
                    target: EffectTarget::Targets,
                    amount: 1,
                }],
                target: Some(any_target()),
                description: "deal 1 damage to any target".to_string(),
            }))
            .with_text("{T}: Prodigal Pyromancer deals 1 damage to any target."),
        creature("Wall of Reverence", "3W", 1, 6)
            .with_subtypes(&["Spirit", "Wall"])
            .with_keywords(&[Keyword::Defender, Keyword::Flying])
            .with_ability(triggered(
                TriggerEvent::BeginningOfEndStep,
                TriggerSubject::Player(TargetController::You),
                None,
                vec![Effect::GainLife {
                    target: EffectTarget::Controller,
                    amount: 1,
                }],
                "you gain 1 life",
            ))
            .with_text("Defender, flying. At the beginning of your end step, you gain 1 life."),
        creature("Kiln Fiend", "3R", 1, 2)
            .with_subtypes(&["Elemental", "Beast"])
            .with_ability(triggered(
                TriggerEvent::SpellCast,
                TriggerSubject::Player(TargetController::You),
                None,
                vec![Effect::Pump {
                    target: EffectTarget::Source,
                    power: 3,
                    toughness: 0,
                }],
                "Kiln Fiend gets +3/+0 until end of turn",
            ))
            .with_text("Whenever you cast a spell, Kiln Fiend gets +3/+0 until end of turn."),
        creature("Benevolent Bodyguard", "W", 1, 1)
            .with_subtypes(&["Human", "Cleric"])
            .with_ability(Ability::Replacement(ReplacementEffect::PreventDamage {
                filter: Filter::creature().with(Predicate::IsSource),
            }))
            .with_text("Prevent all damage that would be dealt to Benevolent Bodyguard."),
    ]
}

fn commanders() -> Vec<CardDefinition> {
    vec![
        creature("Isamaru, Hound of Konda", "W", 2, 2)
            .legendary()
            .with_subtypes(&["Dog"]),
        creature("Zur the Enchanter", "1WUB", 1, 4)
            .legendary()
            .with_subtypes(&["Human", "Wizard"])
            .with_keywords(&[Keyword::Flying])
            .with_text("Flying"),
        creature("Kamahl, Fist of Krosa", "4GG", 4, 3)
            .legendary()
            .with_subtypes(&["Human", "Druid"]),
        creature("Ruhan of the Fomori", "1RWU", 7, 7)
            .legendary()
            .with_subtypes(&["Giant", "Warrior"]),
    ]
}

fn enchantments() -> Vec<CardDefinition> {
    vec![
        CardDefinition::new("Glorious Anthem", &[CardType::Enchantment])
            .with_cost(cost("1WW"))
            .with_ability(Ability::Static(StaticAbility::Anthem {
                filter: Filter::creature().with(Predicate::ControlledBy(TargetController::You)),
                power: 1,
                toughness: 1,
            }))
            .with_text("Creatures you control get +1/+1."),
        CardDefinition::new("Phyrexian Arena", &[CardType::Enchantment])
            .with_cost(cost("1BB"))
            .with_ability(triggered(
                TriggerEvent::BeginningOfUpkeep,
                TriggerSubject::Player(TargetController::You),
                None,
                vec![
                    Effect::DrawCards {
                        target: EffectTarget::Controller,
                        count: 1,
                    },
                    Effect::LoseLife {
                        target: EffectTarget::Controller,
                        amount: 1,
                    },
                ],
                "draw a card and lose 1 life",
            ))
            .with_text("At the beginning of your upkeep, you draw a card and you lose 1 life."),
    ]
}

fn spells() -> Vec<CardDefinition> {
    vec![
        instant(
            "Lightning Bolt",
            "R",
            Some(any_target()),
            vec![Effect::DealDamage {
                target: EffectTarget::Targets,
                amount: 3,
            }],
            "Lightning Bolt deals 3 damage to any target.",
        ),
        instant(
            "Shock",
            "R",
            Some(any_target()),
            vec![Effect::DealDamage {
                target: EffectTarget::Targets,
                amount: 2,
            }],
            "Shock deals 2 damage to any target.",
        ),
        instant(
            "Giant Growth",
            "G",
            Some(target_creature()),
            vec![Effect::Pump {
                target: EffectTarget::Targets,
                power: 3,
                toughness: 3,
            }],
            "Target creature gets +3/+3 until end of turn.",
        ),
        instant(
            "Murder",
            "1BB",
            Some(target_creature()),
            vec![Effect::Destroy {
                target: EffectTarget::Targets,
            }],
            "Destroy target creature.",
        ),
        instant(
            "Unsummon",
            "U",
            Some(target_creature()),
            vec![Effect::ReturnToHand {
                target: EffectTarget::Targets,
            }],
            "Return target creature to its owner's hand.",
        ),
        instant(
            "Pressure Point",
            "1W",
            Some(target_creature()),
            vec![
                Effect::Tap {
                    target: EffectTarget::Targets,
                },
                Effect::DrawCards {
                    target: EffectTarget::Controller,
                    count: 1,
                },
            ],
            "Tap target creature. Draw a card.",
        ),
        instant(
            "Healing Salve",
            "W",
            Some(target_player()),
            vec![Effect::GainLife {
                target: EffectTarget::Targets,
                amount: 3,
            }],
            "Target player gains 3 life.",
        ),
        instant(
            "Thought Scour",
            "U",
            Some(target_player()),
            vec![
                Effect::Mill {
                    target: EffectTarget::Targets,
                    count: 2,
                },
                Effect::DrawCards {
                    target: EffectTarget::Controller,
                    count: 1,
                },
            ],
            "Target player mills two cards. Draw a card.",
        ),
        instant(
            "Shatter",
            "1R",
            Some(TargetSpec::exactly_one(TargetKind::Permanent(Filter::artifact()))),
            vec![Effect::Destroy {
                target: EffectTarget::Targets,
            }],
            "Destroy target artifact.",
        ),
        sorcery(
            "Divination",
            "2U",
            None,
            vec![Effect::DrawCards {
                target: EffectTarget::Controller,
                count: 2,
            }],
            "Draw two cards.",
        ),
        sorcery(
            "Lava Axe",
            "4R",
            Some(target_player()),
            vec![Effect::DealDamage {
                target: EffectTarget::Targets,
                amount: 5,
            }],
            "Lava Axe deals 5 damage to target player.",
        ),
        sorcery(
            "Sign in Blood",
            "BB",
            Some(target_player()),
            vec![
                Effect::DrawCards {
                    target: EffectTarget::Targets,
                    count: 2,
                },
                Effect::LoseLife {
                    target: EffectTarget::Targets,
                    amount: 2,
                },
            ],
            "Target player draws two cards and loses 2 life.",
        ),
        sorcery(
            "Stone Rain",
            "2R",
            Some(TargetSpec::exactly_one(TargetKind::Permanent(Filter::land()))),
            vec![Effect::Destroy {
                target: EffectTarget::Targets,
            }],
            "Destroy target land.",
        ),
    ]
}

/// Every built-in definition
pub fn builtin_cards() -> Vec<CardDefinition> {
    let mut cards = lands();
    cards.extend(artifacts());
    cards.extend(creatures());
    cards.extend(commanders());
    cards.extend(enchantments());
    cards.extend(spells());
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs_parse() {
        for card in builtin_cards() {
            let free = card.is_type(CardType::Land) || card.name.as_str() == "Ornithopter";
            assert_eq!(card.mana_cost.is_empty(), free, "{}", card.name);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let cards = builtin_cards();
        let mut names: Vec<String> = cards.iter().map(|c| c.name.normalized()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), cards.len());
    }

    #[test]
    fn test_commanders_are_legendary_creatures() {
        for card in commanders() {
            assert!(card.legendary && card.is_type(CardType::Creature), "{}", card.name);
        }
    }

    #[test]
    fn test_lumengrid_sentinel_trigger_is_optional() {
        let sentinel = creatures()
            .into_iter()
            .find(|c| c.name.as_str() == "Lumengrid Sentinel")
            .unwrap();
        let trigger = sentinel.abilities[0].as_triggered().unwrap();
        assert!(trigger.optional);
        assert_eq!(trigger.event, TriggerEvent::EntersBattlefield);
    }
}
