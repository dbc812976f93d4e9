//! Static category taxonomy: major groups, their minor labels, hues and
//! boost overrides.

use crate::error::TaxonomyError;
use crate::species::Species;
use fnv::FnvHashMap;

/// Dense index of a minor label inside a [`CategoryTaxonomy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u16);

impl LabelId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a major group inside a [`CategoryTaxonomy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u8);

impl GroupId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A top-level semantic bucket aggregating several classifier labels.
#[derive(Clone, Debug)]
pub struct MajorGroup {
    pub name: String,
    /// Hue in degrees, 0..=360.
    pub hue: f32,
    pub species: Species,
    /// Labels in declaration order; this order is the spawn tie-break.
    pub labels: Vec<LabelId>,
}

/// Amplifies one group's boosted targets by the raw score of a sentinel class.
#[derive(Clone, Debug)]
pub struct Modulator {
    pub group: GroupId,
    /// Classifier class name; may lie outside the taxonomy.
    pub sentinel: String,
    pub factor: f32,
}

/// Immutable taxonomy shared by every component.
#[derive(Clone, Debug)]
pub struct CategoryTaxonomy {
    groups: Vec<MajorGroup>,
    label_names: Vec<String>,
    label_groups: Vec<GroupId>,
    boosts: Vec<f32>,
    lookup: FnvHashMap<String, LabelId>,
    modulator: Option<Modulator>,
}

impl CategoryTaxonomy {
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::default()
    }

    /// The five-group taxonomy used by the immersive and cinema scenes.
    pub fn ambient_default() -> Result<Self, TaxonomyError> {
        Self::builder()
            .group(
                "Forest & Life",
                120.0,
                Species::Flock,
                &["Bird", "Rustling leaves"],
            )
            .group("Water", 190.0, Species::Water, &["Ocean", "Water", "Stream"])
            .group(
                "Atmosphere",
                60.0,
                Species::Wind,
                &["Thunderstorm", "Wind", "Fire"],
            )
            .group(
                "Traffic",
                0.0,
                Species::Machine,
                &["Aircraft", "Car", "Rail transport"],
            )
            .group(
                "Music",
                30.0,
                Species::Pulse,
                &["Drum machine", "Percussion", "Synthesizer"],
            )
            .boost("Thunderstorm", 2.0)
            .modulator("Music", "Music", crate::constants::MODULATION_FACTOR)
            .build()
    }

    /// The larger label set used by the flat, mic and stamp scenes.
    pub fn extended() -> Result<Self, TaxonomyError> {
        Self::builder()
            .group(
                "Forest & Life",
                120.0,
                Species::Flock,
                &[
                    "Bird",
                    "Rustling leaves",
                    "Outside, rural or natural",
                    "Forest",
                    "Insect",
                ],
            )
            .group("Water", 190.0, Species::Water, &["Ocean", "Water", "Stream"])
            .group(
                "Atmosphere",
                60.0,
                Species::Wind,
                &["Thunderstorm", "Wind", "Fire", "Rain"],
            )
            .group(
                "Traffic",
                0.0,
                Species::Machine,
                &[
                    "Aircraft",
                    "Car",
                    "Rail transport",
                    "Motor vehicle (road)",
                    "Speech",
                ],
            )
            .group(
                "Music",
                30.0,
                Species::Pulse,
                &[
                    "Drum machine",
                    "Percussion",
                    "Rattle (instrument)",
                    "Synthesizer",
                    "Guitar",
                    "Piano",
                    "Hands",
                ],
            )
            .boost("Speech", 0.001)
            .boost("Thunderstorm", 2.0)
            .modulator("Music", "Music", crate::constants::MODULATION_FACTOR)
            .build()
    }

    #[inline]
    pub fn groups(&self) -> &[MajorGroup] {
        &self.groups
    }

    #[inline]
    pub fn group(&self, id: GroupId) -> &MajorGroup {
        &self.groups[id.index()]
    }

    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        (0..self.groups.len()).map(|i| GroupId(i as u8))
    }

    pub fn group_by_name(&self, name: &str) -> Option<GroupId> {
        self.groups
            .iter()
            .position(|g| g.name == name)
            .map(|i| GroupId(i as u8))
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn label_count(&self) -> usize {
        self.label_names.len()
    }

    #[inline]
    pub fn label_name(&self, id: LabelId) -> &str {
        &self.label_names[id.index()]
    }

    #[inline]
    pub fn group_of(&self, id: LabelId) -> GroupId {
        self.label_groups[id.index()]
    }

    #[inline]
    pub fn hue(&self, group: GroupId) -> f32 {
        self.groups[group.index()].hue
    }

    /// Multiplicative override for a label, 1.0 when none was declared.
    #[inline]
    pub fn boost(&self, id: LabelId) -> f32 {
        self.boosts[id.index()]
    }

    /// Resolves a classifier class name. Unknown names yield `None`.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<LabelId> {
        self.lookup.get(name).copied()
    }

    #[inline]
    pub fn modulator(&self) -> Option<&Modulator> {
        self.modulator.as_ref()
    }

    /// Every (group, label) pair, groups in declaration order and labels in
    /// their group's order.
    pub fn pairs(&self) -> impl Iterator<Item = (GroupId, LabelId)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(gi, g)| g.labels.iter().map(move |&l| (GroupId(gi as u8), l)))
    }
}

struct PendingGroup {
    name: String,
    hue: f32,
    species: Species,
    labels: Vec<String>,
}

/// Collects groups and overrides, validating everything in [`build`](Self::build).
#[derive(Default)]
pub struct TaxonomyBuilder {
    groups: Vec<PendingGroup>,
    boosts: Vec<(String, f32)>,
    modulator: Option<(String, String, f32)>,
}

impl TaxonomyBuilder {
    pub fn group(mut self, name: &str, hue: f32, species: Species, labels: &[&str]) -> Self {
        self.groups.push(PendingGroup {
            name: name.to_owned(),
            hue,
            species,
            labels: labels.iter().map(|s| (*s).to_owned()).collect(),
        });
        self
    }

    pub fn boost(mut self, label: &str, factor: f32) -> Self {
        self.boosts.push((label.to_owned(), factor));
        self
    }

    pub fn modulator(mut self, group: &str, sentinel: &str, factor: f32) -> Self {
        self.modulator = Some((group.to_owned(), sentinel.to_owned(), factor));
        self
    }

    pub fn build(self) -> Result<CategoryTaxonomy, TaxonomyError> {
        if self.groups.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        if self.groups.len() > u8::MAX as usize {
            return Err(TaxonomyError::TooMany {
                what: "groups",
                max: u8::MAX as usize,
            });
        }

        let mut groups: Vec<MajorGroup> = Vec::with_capacity(self.groups.len());
        let mut label_names = Vec::new();
        let mut label_groups = Vec::new();
        let mut lookup: FnvHashMap<String, LabelId> = FnvHashMap::default();

        for (gi, pending) in self.groups.into_iter().enumerate() {
            if groups.iter().any(|g| g.name == pending.name) {
                return Err(TaxonomyError::DuplicateGroup(pending.name));
            }
            if pending.labels.is_empty() {
                return Err(TaxonomyError::EmptyGroup(pending.name));
            }
            if !pending.hue.is_finite() || !(0.0..=360.0).contains(&pending.hue) {
                return Err(TaxonomyError::InvalidHue {
                    group: pending.name,
                    hue: pending.hue,
                });
            }
            let group_id = GroupId(gi as u8);
            let mut ids = Vec::with_capacity(pending.labels.len());
            for label in pending.labels {
                if let Some(existing) = lookup.get(&label) {
                    let owner = label_groups[existing.index()];
                    let first = match groups.get(GroupId::index(owner)) {
                        Some(g) => g.name.clone(),
                        None => pending.name.clone(),
                    };
                    return Err(TaxonomyError::DuplicateLabel {
                        label,
                        first,
                        second: pending.name,
                    });
                }
                if label_names.len() >= u16::MAX as usize {
                    return Err(TaxonomyError::TooMany {
                        what: "labels",
                        max: u16::MAX as usize,
                    });
                }
                let id = LabelId(label_names.len() as u16);
                lookup.insert(label.clone(), id);
                label_names.push(label);
                label_groups.push(group_id);
                ids.push(id);
            }
            groups.push(MajorGroup {
                name: pending.name,
                hue: pending.hue,
                species: pending.species,
                labels: ids,
            });
        }

        let mut boosts = vec![1.0; label_names.len()];
        for (label, factor) in self.boosts {
            let Some(id) = lookup.get(&label).copied() else {
                return Err(TaxonomyError::UnknownLabel(label));
            };
            if !factor.is_finite() || factor < 0.0 {
                return Err(TaxonomyError::InvalidBoost { label, factor });
            }
            boosts[id.index()] = factor;
        }

        let modulator = match self.modulator {
            Some((group, sentinel, factor)) => {
                let Some(gi) = groups.iter().position(|g| g.name == group) else {
                    return Err(TaxonomyError::UnknownGroup(group));
                };
                if !factor.is_finite() || factor < 0.0 {
                    return Err(TaxonomyError::InvalidBoost {
                        label: sentinel,
                        factor,
                    });
                }
                Some(Modulator {
                    group: GroupId(gi as u8),
                    sentinel,
                    factor,
                })
            }
            None => None,
        };

        Ok(CategoryTaxonomy {
            groups,
            label_names,
            label_groups,
            boosts,
            lookup,
            modulator,
        })
    }
}
