//! Historique des calculs + contrat de persistance.
//!
//! Ordre d’affichage : épinglées d’abord, puis horodatage décroissant
//! (id décroissant à horodatage égal). Une entrée ne change jamais
//! d’expression ni de résultat : seul le drapeau `epingle` bouge.
//!
//! La persistance est « au mieux » : un échec est journalisé, l’état en
//! mémoire reste la référence, et un dernier vidage est tenté à la fermeture.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::erreur::ErreurStockage;

/// Clé fixe du blob d’historique chez le collaborateur de persistance.
pub const CLE_HISTORIQUE: &str = "historique_calculs";

/// Collaborateur de persistance : un simple magasin clé -> octets.
pub trait StockageCle {
    fn charger(&self, cle: &str) -> Option<Vec<u8>>;
    fn sauver(&mut self, cle: &str, blob: &[u8]) -> Result<(), ErreurStockage>;
}

/// Magasin en mémoire (tests, wasm).
#[derive(Clone, Debug, Default)]
pub struct StockageMemoire {
    blobs: HashMap<String, Vec<u8>>,
    /// Si vrai, toute écriture échoue (simulation de panne).
    pub en_panne: bool,
}

impl StockageMemoire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&self, cle: &str) -> Option<&[u8]> {
        self.blobs.get(cle).map(Vec::as_slice)
    }
}

impl StockageCle for StockageMemoire {
    fn charger(&self, cle: &str) -> Option<Vec<u8>> {
        self.blobs.get(cle).cloned()
    }

    fn sauver(&mut self, cle: &str, blob: &[u8]) -> Result<(), ErreurStockage> {
        if self.en_panne {
            return Err(ErreurStockage::Indisponible);
        }
        self.blobs.insert(cle.to_string(), blob.to_vec());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntreeHistorique {
    pub id: u64,
    pub expression: String,
    pub resultat: f64,
    pub horodatage: DateTime<Utc>,
    #[serde(default)]
    pub epingle: bool,
}

pub struct JournalHistorique {
    entrees: Vec<EntreeHistorique>,
    stockage: Box<dyn StockageCle>,
    max_non_epinglees: usize,
    /// Dernière écriture échouée : à retenter au vidage final.
    sale: bool,
}

impl JournalHistorique {
    /// Charge le blob existant. Blob absent ou corrompu => historique vide.
    pub fn ouvrir(stockage: Box<dyn StockageCle>, max_non_epinglees: usize) -> Self {
        let entrees = match stockage.charger(CLE_HISTORIQUE) {
            None => Vec::new(),
            Some(blob) => match decoder(&blob) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("historique illisible, on repart à vide: {e}");
                    Vec::new()
                }
            },
        };
        tracing::info!(entrees = entrees.len(), "historique chargé");

        let mut j = Self {
            entrees,
            stockage,
            max_non_epinglees,
            sale: false,
        };
        j.trier();
        j
    }

    /// Entrées dans l’ordre d’affichage.
    pub fn entrees(&self) -> &[EntreeHistorique] {
        &self.entrees
    }

    pub fn est_sale(&self) -> bool {
        self.sale
    }

    /// Nouvelle entrée horodatée maintenant.
    pub fn record(&mut self, expression: impl Into<String>, resultat: f64) -> u64 {
        self.record_a(expression, resultat, Utc::now())
    }

    /// Nouvelle entrée avec un horodatage explicite.
    pub fn record_a(
        &mut self,
        expression: impl Into<String>,
        resultat: f64,
        horodatage: DateTime<Utc>,
    ) -> u64 {
        let id = self.entrees.iter().map(|e| e.id).max().map_or(1, |m| m + 1);
        self.entrees.insert(
            0,
            EntreeHistorique {
                id,
                expression: expression.into(),
                resultat,
                horodatage,
                epingle: false,
            },
        );
        self.trier();
        self.evincer();
        self.persister();
        id
    }

    /// Inverse l’épinglage. Faux si l’id est inconnu.
    pub fn toggle_pin(&mut self, id: u64) -> bool {
        let Some(e) = self.entrees.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        e.epingle = !e.epingle;
        self.trier();
        self.persister();
        true
    }

    /// Supprime les entrées dont l’id est listé. Retourne le nombre retiré.
    pub fn delete(&mut self, ids: &[u64]) -> usize {
        let avant = self.entrees.len();
        self.entrees.retain(|e| !ids.contains(&e.id));
        let retirees = avant - self.entrees.len();
        if retirees > 0 {
            self.persister();
        }
        retirees
    }

    /// Résultat stocké, pour amorcer un nouveau calcul. Ne modifie rien.
    pub fn reuse(&self, id: u64) -> Option<f64> {
        self.entrees.iter().find(|e| e.id == id).map(|e| e.resultat)
    }

    /// Vidage final (fermeture) : seulement si une écriture a échoué.
    pub fn vider(&mut self) {
        if self.sale {
            self.persister();
        }
    }

    fn trier(&mut self) {
        self.entrees
            .sort_by_key(|e| (Reverse(e.epingle), Reverse(e.horodatage), Reverse(e.id)));
    }

    /// Retire les plus anciennes non épinglées au-delà du plafond.
    fn evincer(&mut self) {
        let mut vues = 0usize;
        self.entrees.retain(|e| {
            if e.epingle {
                return true;
            }
            vues += 1;
            vues <= self.max_non_epinglees
        });
    }

    fn persister(&mut self) {
        let resultat = encoder(&self.entrees)
            .and_then(|blob| self.stockage.sauver(CLE_HISTORIQUE, &blob));
        match resultat {
            Ok(()) => self.sale = false,
            Err(e) => {
                tracing::warn!("sauvegarde de l’historique impossible: {e}");
                self.sale = true;
            }
        }
    }
}

pub fn encoder(entrees: &[EntreeHistorique]) -> Result<Vec<u8>, ErreurStockage> {
    Ok(serde_json::to_vec(entrees)?)
}

pub fn decoder(blob: &[u8]) -> Result<Vec<EntreeHistorique>, ErreurStockage> {
    Ok(serde_json::from_slice(blob)?)
}
