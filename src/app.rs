// src/app.rs
//
// Calculatrice — module App (racine)
// ----------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs + stockage.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Le clavier est lu dans vue.rs (une touche = une Action du noyau).
// - Le vidage final de l’historique se fait quand AppCalc est détruit
//   (Drop du contrôleur), à la fermeture de la fenêtre.

pub mod etat;
pub mod stockage;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;

use eframe::egui;

use crate::noyau::{StockageCle, StockageMemoire};

impl AppCalc {
    /// Réglages + historique persistant (natif), en mémoire sinon.
    pub fn demarrer() -> Self {
        let reglages = stockage::charger_reglages();
        let magasin: Box<dyn StockageCle> = match stockage::StockageFichier::par_defaut() {
            Some(s) => Box::new(s),
            None => {
                tracing::info!("pas de répertoire de données : historique en mémoire");
                Box::new(StockageMemoire::new())
            }
        };
        Self::new(reglages, magasin)
    }
}

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui); // méthode publique (dans vue.rs)
        });
    }
}
