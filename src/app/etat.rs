//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : posséder le contrôleur du noyau et le peu d’état propre à la
//! présentation (panneau historique, filtre de recherche).
//!
//! Contrats (version UI) :
//! - Aucune évaluation ici : tout passe par le contrôleur.
//! - L’état affiché est relu du contrôleur à chaque frame, jamais recopié.

use crate::noyau::{format_nombre_avec, Action, Controleur, EntreeHistorique, Reglages, StockageCle};

/// Garde-fou : filtre de recherche borné (anti-abus).
const RECHERCHE_MAX: usize = 64;

pub struct AppCalc {
    // --- noyau ---
    pub ctrl: Controleur,

    // --- panneau historique ---
    pub historique_visible: bool,
    pub recherche: String,
}

impl AppCalc {
    pub fn new(reglages: Reglages, stockage: Box<dyn StockageCle>) -> Self {
        Self {
            ctrl: Controleur::new(reglages, stockage),
            historique_visible: false,
            recherche: String::new(),
        }
    }

    /* ------------------------ Actions “boutons” ------------------------ */

    /// Une touche : l’erreur éventuelle reste dans l’état du contrôleur.
    pub fn touche(&mut self, action: Action) {
        if let Err(e) = self.ctrl.handle(action) {
            tracing::trace!(%e, ?action, "touche refusée");
        }
    }

    /// Réutiliser une entrée : on referme le panneau pour voir la saisie.
    pub fn reutiliser(&mut self, id: u64) {
        if self.ctrl.reuse_history_entry(id).is_some() {
            self.historique_visible = false;
        }
    }

    pub fn borner_recherche(&mut self) {
        if self.recherche.chars().count() > RECHERCHE_MAX {
            self.recherche = self.recherche.chars().take(RECHERCHE_MAX).collect();
        }
    }

    /// Entrées visibles : sous-chaîne insensible à la casse, sur l’expression
    /// ou sur le résultat formaté. Filtre vide => tout.
    pub fn entrees_filtrees(&self) -> Vec<&EntreeHistorique> {
        let chiffres = self.ctrl.reglages().chiffres_fraction;
        filtrer(self.ctrl.historique(), &self.recherche, chiffres)
    }
}

pub fn filtrer<'a>(
    entrees: &'a [EntreeHistorique],
    recherche: &str,
    chiffres: usize,
) -> Vec<&'a EntreeHistorique> {
    let motif = recherche.trim().to_lowercase();
    if motif.is_empty() {
        return entrees.iter().collect();
    }
    entrees
        .iter()
        .filter(|e| {
            e.expression.to_lowercase().contains(&motif)
                || format_nombre_avec(e.resultat, chiffres).contains(&motif)
        })
        .collect()
}
