//! Réglages du noyau (reglages.toml).
//!
//! Tous les champs ont une valeur par défaut : un fichier absent ou partiel
//! donne une calculatrice utilisable.

use serde::Deserialize;

use super::format::{CHIFFRES_FRACTION_DEFAUT, CHIFFRES_FRACTION_MAX};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniteAngle {
    #[default]
    Radians,
    Degres,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Reglages {
    /// Décimales affichées au plus.
    pub chiffres_fraction: usize,
    /// Unité des arguments de sin/cos/tan.
    pub unite_angle: UniteAngle,
    /// Entrées non épinglées conservées dans l’historique.
    pub historique_max: usize,
    /// Chiffres acceptés dans le tampon de saisie.
    pub chiffres_saisie_max: usize,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            chiffres_fraction: CHIFFRES_FRACTION_DEFAUT,
            unite_angle: UniteAngle::Radians,
            historique_max: 100,
            chiffres_saisie_max: 16,
        }
    }
}

impl Reglages {
    /// Lecture TOML + garde-fous. Un texte illisible donne les défauts.
    pub fn depuis_toml(texte: &str) -> Self {
        match toml::from_str::<Reglages>(texte) {
            Ok(r) => r.borne(),
            Err(e) => {
                tracing::warn!("reglages.toml illisible, valeurs par défaut: {e}");
                Self::default()
            }
        }
    }

    fn borne(mut self) -> Self {
        self.chiffres_fraction = self.chiffres_fraction.min(CHIFFRES_FRACTION_MAX);
        self.chiffres_saisie_max = self.chiffres_saisie_max.clamp(1, 32);
        self.historique_max = self.historique_max.max(1);
        self
    }
}
