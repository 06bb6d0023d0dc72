//! src/app/stockage.rs
//!
//! Collaborateur de persistance natif : un fichier par clé sous le
//! répertoire de données de l’utilisateur. Réglages lus au démarrage.
//!
//! En wasm32 : pas de disque, l’historique vit en mémoire.

use std::fs;
use std::path::PathBuf;

use crate::noyau::erreur::ErreurStockage;
use crate::noyau::{Reglages, StockageCle};

/// Sous-répertoire commun (données + config).
const NOM_APP: &str = "calculatrice_saisie";

pub struct StockageFichier {
    racine: PathBuf,
}

impl StockageFichier {
    pub fn new(racine: PathBuf) -> Self {
        Self { racine }
    }

    /// `<données utilisateur>/calculatrice_saisie`, si le système en fournit un.
    pub fn par_defaut() -> Option<Self> {
        repertoire_donnees().map(Self::new)
    }

    fn chemin(&self, cle: &str) -> PathBuf {
        self.racine.join(format!("{cle}.json"))
    }
}

impl StockageCle for StockageFichier {
    fn charger(&self, cle: &str) -> Option<Vec<u8>> {
        let chemin = self.chemin(cle);
        match fs::read(&chemin) {
            Ok(octets) => Some(octets),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("lecture de {} impossible: {e}", chemin.display());
                None
            }
        }
    }

    fn sauver(&mut self, cle: &str, blob: &[u8]) -> Result<(), ErreurStockage> {
        fs::create_dir_all(&self.racine)?;

        // écriture atomique : fichier temporaire puis renommage
        let chemin = self.chemin(cle);
        let tmp = chemin.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &chemin)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn repertoire_donnees() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(NOM_APP))
}

#[cfg(target_arch = "wasm32")]
fn repertoire_donnees() -> Option<PathBuf> {
    None
}

/// reglages.toml dans le répertoire de config ; absent => défauts.
#[cfg(not(target_arch = "wasm32"))]
pub fn charger_reglages() -> Reglages {
    let Some(chemin) = dirs::config_dir().map(|d| d.join(NOM_APP).join("reglages.toml")) else {
        return Reglages::default();
    };
    match fs::read_to_string(&chemin) {
        Ok(texte) => Reglages::depuis_toml(&texte),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Reglages::default(),
        Err(e) => {
            tracing::warn!("lecture de {} impossible: {e}", chemin.display());
            Reglages::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn charger_reglages() -> Reglages {
    Reglages::default()
}
