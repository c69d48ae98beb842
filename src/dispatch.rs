
use rand::seq::SliceRandom;
use roaring::RoaringTreemap;
use tracing::debug;

use crate::catalog::{Catalog, Facet, GraphKind};
use crate::engine::EngineSettings;
use crate::query::{DisplayFormat, Grouping, Modifier, ModifierKind, Ordering};
use crate::results::SearchResult;

/// Apply one modifier to the result. Every irregularity short of a parse
/// error degrades to a no-op or an empty match here, never a failure.
pub async fn apply<C: Catalog + ?Sized>(
    catalog: &C,
    settings: &EngineSettings,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    match modifier.kind() {
        ModifierKind::Zone => membership_filter(catalog, result, modifier, Facet::Zone).await,
        ModifierKind::Role => membership_filter(catalog, result, modifier, Facet::Role).await,
        ModifierKind::Family => membership_filter(catalog, result, modifier, Facet::Family).await,
        ModifierKind::Order => membership_filter(catalog, result, modifier, Facet::Order).await,
        ModifierKind::Class => membership_filter(catalog, result, modifier, Facet::Class).await,
        ModifierKind::Phylum => membership_filter(catalog, result, modifier, Facet::Phylum).await,
        ModifierKind::Kingdom => membership_filter(catalog, result, modifier, Facet::Kingdom).await,
        ModifierKind::Domain => membership_filter(catalog, result, modifier, Facet::Domain).await,
        ModifierKind::Taxon => membership_filter(catalog, result, modifier, Facet::Taxon).await,
        ModifierKind::Generation => generation_filter(catalog, settings, result, modifier).await,
        ModifierKind::Creator => creator_filter(catalog, result, modifier).await,
        ModifierKind::Status => status_filter(catalog, result, modifier).await,
        ModifierKind::Prey => edge_filter(catalog, result, modifier, GraphKind::Prey).await,
        ModifierKind::Predator => edge_filter(catalog, result, modifier, GraphKind::Predator).await,
        ModifierKind::Has => has_filter(catalog, result, modifier).await,
        ModifierKind::Ancestor => edge_filter(catalog, result, modifier, GraphKind::Ancestor).await,
        ModifierKind::Descendant => {
            edge_filter(catalog, result, modifier, GraphKind::Descendant).await
        }
        ModifierKind::Random => random_take(result, modifier),
        ModifierKind::Limit => limit_take(catalog, result, modifier),
        ModifierKind::Artist => artist_filter(catalog, result, modifier).await,
        ModifierKind::GroupBy(grouping) => {
            apply_grouping(catalog, settings, result, grouping).await
        }
        ModifierKind::OrderBy(ordering) => {
            if let Some(ordering) = ordering {
                result.set_order_by(ordering);
            }
        }
        ModifierKind::Format(format) => apply_format(result, format),
        ModifierKind::Unknown => {
            debug!(name = modifier.name(), "ignoring unknown modifier");
        }
    }
}

/// Keep records whose membership set for the facet intersects the
/// modifier's comma-separated value list.
async fn membership_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
    facet: Facet,
) {
    let wanted = modifier.values();
    if wanted.is_empty() {
        return;
    }
    let wanted = &wanted;
    result
        .filter(
            move |record| async move {
                catalog
                    .memberships(&record, facet)
                    .await
                    .iter()
                    .any(|membership| wanted.contains(&membership.to_lowercase()))
            },
            modifier.subtractive(),
        )
        .await;
}

async fn generation_filter<C: Catalog + ?Sized>(
    catalog: &C,
    settings: &EngineSettings,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    if !settings.generations {
        debug!("generation tracking disabled, modifier is a no-op");
        return;
    }
    let wanted = modifier.values();
    if wanted.is_empty() {
        return;
    }
    let wanted = &wanted;
    result
        .filter(
            move |record| async move {
                match catalog.generation_by_date(record.created_at()).await {
                    Some(generation) => wanted.contains(&generation.name().to_lowercase()),
                    None => false,
                }
            },
            modifier.subtractive(),
        )
        .await;
}

/// Filter by owner identity when the value resolves to a known user,
/// otherwise by case-insensitive owner name.
async fn creator_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    let resolved = catalog.resolve_user(modifier.value()).await;
    let name = modifier.value().to_lowercase();
    let name = &name;
    result
        .filter(
            move |record| async move {
                match resolved {
                    Some(user) => record.owner().id() == Some(user),
                    None => record.owner().name().to_lowercase() == *name,
                }
            },
            modifier.subtractive(),
        )
        .await;
}

async fn status_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    match modifier.value().to_lowercase().as_str() {
        "lc" | "extant" => {
            result
                .filter(
                    |record| async move { !record.is_extinct() },
                    modifier.subtractive(),
                )
                .await;
        }
        "ex" | "extinct" => {
            result
                .filter(
                    |record| async move { record.is_extinct() },
                    modifier.subtractive(),
                )
                .await;
        }
        "en" | "endangered" => {
            result
                .filter(
                    move |record| async move { catalog.is_endangered(&record).await },
                    modifier.subtractive(),
                )
                .await;
        }
        other => {
            debug!(value = other, "ignoring unknown status value");
        }
    }
}

/// Resolve the value to exactly one record, then keep records with a
/// graph edge to it. An unresolved or ambiguous reference matches
/// nothing.
async fn edge_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
    kind: GraphKind,
) {
    let target = catalog
        .resolve_single(modifier.value())
        .await
        .map(|record| record.id());
    result
        .filter(
            move |record| async move {
                match target {
                    Some(target) => catalog.graph_neighbors(&record, kind).await.contains(&target),
                    None => false,
                }
            },
            modifier.subtractive(),
        )
        .await;
}

#[derive(Clone, Copy)]
enum Possession {
    Neighbors(GraphKind),
    Roles,
    Pictures,
    Size,
}

async fn has_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    let possession = match modifier.value().to_lowercase().as_str() {
        "prey" => Possession::Neighbors(GraphKind::Prey),
        "predator" | "predators" => Possession::Neighbors(GraphKind::Predator),
        "ancestor" | "ancestors" => Possession::Neighbors(GraphKind::Ancestor),
        "descendant" | "descendants" | "evo" | "evos" => {
            Possession::Neighbors(GraphKind::Descendant)
        }
        "role" | "roles" => Possession::Roles,
        "pic" | "pics" | "image" | "images" => Possession::Pictures,
        "size" => Possession::Size,
        other => {
            debug!(value = other, "ignoring unknown possession");
            return;
        }
    };
    result
        .filter(
            move |record| async move {
                match possession {
                    Possession::Neighbors(kind) => {
                        !catalog.graph_neighbors(&record, kind).await.is_empty()
                    }
                    Possession::Roles => {
                        !catalog.memberships(&record, Facet::Role).await.is_empty()
                    }
                    Possession::Pictures => !catalog.pictures(&record).await.is_empty(),
                    Possession::Size => catalog.extract_size(record.description()).is_some(),
                }
            },
            modifier.subtractive(),
        )
        .await;
}

async fn artist_filter<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    modifier: &Modifier,
) {
    let artist = modifier.value().to_lowercase();
    let artist = &artist;
    result
        .filter(
            move |record| async move {
                catalog
                    .pictures(&record)
                    .await
                    .iter()
                    .any(|picture| picture.artist().to_lowercase() == *artist)
            },
            modifier.subtractive(),
        )
        .await;
}

/// Keep `n` records chosen uniformly, without replacement, from the
/// whole current result. Selection operators ignore the subtractive
/// flag.
fn random_take(result: &mut SearchResult, modifier: &Modifier) {
    let n: usize = match modifier.value().parse() {
        Ok(n) if n > 0 => n,
        _ => {
            debug!(value = modifier.value(), "ignoring non-numeric random count");
            return;
        }
    };
    let pool = result.all_records();
    let mut keep = RoaringTreemap::new();
    for record in pool.choose_multiple(&mut rand::thread_rng(), n) {
        keep.insert(record.id());
    }
    result.retain_ids(&keep);
}

/// Keep the first `n` records of the current ordered result. Also a
/// selection operator, so the subtractive flag is ignored.
fn limit_take<C: Catalog + ?Sized>(catalog: &C, result: &mut SearchResult, modifier: &Modifier) {
    let n: usize = match modifier.value().parse() {
        Ok(n) if n > 0 => n,
        _ => {
            debug!(value = modifier.value(), "ignoring non-numeric limit");
            return;
        }
    };
    result.limit(n, catalog);
}

async fn apply_grouping<C: Catalog + ?Sized>(
    catalog: &C,
    settings: &EngineSettings,
    result: &mut SearchResult,
    grouping: Option<Grouping>,
) {
    let Some(grouping) = grouping else {
        debug!("ignoring unknown grouping value");
        return;
    };
    match grouping {
        Grouping::Zone => facet_grouping(catalog, result, Facet::Zone).await,
        Grouping::Role => facet_grouping(catalog, result, Facet::Role).await,
        Grouping::Family => facet_grouping(catalog, result, Facet::Family).await,
        Grouping::Order => facet_grouping(catalog, result, Facet::Order).await,
        Grouping::Class => facet_grouping(catalog, result, Facet::Class).await,
        Grouping::Phylum => facet_grouping(catalog, result, Facet::Phylum).await,
        Grouping::Kingdom => facet_grouping(catalog, result, Facet::Kingdom).await,
        Grouping::Domain => facet_grouping(catalog, result, Facet::Domain).await,
        Grouping::Genus => {
            result
                .group_by(|record| async move { vec![record.genus().to_lowercase()] })
                .await;
        }
        Grouping::Creator => {
            result
                .group_by(|record| async move { vec![record.owner().name().to_lowercase()] })
                .await;
        }
        Grouping::Status => {
            result
                .group_by(|record| async move {
                    vec![if record.is_extinct() {
                        "extinct".to_string()
                    } else {
                        "extant".to_string()
                    }]
                })
                .await;
        }
        Grouping::Generation => {
            if !settings.generations {
                debug!("generation tracking disabled, grouping is a no-op");
                return;
            }
            result
                .group_by(move |record| async move {
                    match catalog.generation_by_date(record.created_at()).await {
                        Some(generation) => vec![generation.name().to_lowercase()],
                        None => Vec::new(),
                    }
                })
                .await;
        }
    }
}

async fn facet_grouping<C: Catalog + ?Sized>(
    catalog: &C,
    result: &mut SearchResult,
    facet: Facet,
) {
    result
        .group_by(move |record| async move {
            catalog
                .memberships(&record, facet)
                .await
                .into_iter()
                .map(|membership| membership.to_lowercase())
                .collect()
        })
        .await;
}

fn apply_format(result: &mut SearchResult, format: Option<DisplayFormat>) {
    let Some(format) = format else {
        debug!("ignoring unknown format value");
        return;
    };
    result.set_display_format(format);
    // a leaderboard reads top-down by size of group unless the user
    // already chose an ordering
    if format == DisplayFormat::Leaderboard && !result.has_explicit_order() {
        result.propagate_order(Ordering::Count);
    }
}
