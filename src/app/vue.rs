// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Pavé tactile : une touche = une Action du noyau
// - Clavier : chiffres, opérateurs, Enter/=, Backspace, Escape
// - Historique : recherche, épingler, supprimer, réutiliser
//
// Note :
// - La vue ne calcule rien : elle relit l’état du contrôleur à chaque frame.

use eframe::egui;

use super::etat::AppCalc;
use crate::noyau::{format_nombre_avec, Action, ActionMemoire, Cote, Fonction, Operateur};

/// Taille des touches du pavé.
const TOUCHE: [f32; 2] = [64.0, 44.0];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        self.clavier(ui);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Calculatrice");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let libelle = if self.historique_visible {
                            "Pavé"
                        } else {
                            "Historique"
                        };
                        if ui.button(libelle).clicked() {
                            self.historique_visible = !self.historique_visible;
                        }
                    });
                });
                ui.add_space(6.0);

                self.ui_ecran(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if self.historique_visible {
                    self.ui_historique(ui);
                } else {
                    self.ui_pave(ui);
                }
            });
    }

    fn ui_ecran(&mut self, ui: &mut egui::Ui) {
        let etat = self.ctrl.etat();

        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    // équation en cours (petit) puis affichage (grand)
                    ui.monospace(if etat.texte_equation.is_empty() {
                        " ".to_string()
                    } else {
                        etat.texte_equation.clone()
                    });
                    ui.label(
                        egui::RichText::new(&etat.texte_affichage)
                            .monospace()
                            .size(36.0),
                    );
                });

                ui.horizontal(|ui| {
                    if let Some(m) = etat.valeur_memoire {
                        let chiffres = self.ctrl.reglages().chiffres_fraction;
                        ui.small(format!("M = {}", format_nombre_avec(m, chiffres)));
                    }
                    if let Some(msg) = &etat.message_erreur {
                        let rouge = ui.visuals().error_fg_color;
                        ui.colored_label(rouge, msg);
                    }
                });
            });
    }

    fn ui_pave(&mut self, ui: &mut egui::Ui) {
        // Fonctions + mémoire
        ui.horizontal_wrapped(|ui| {
            for f in [
                Fonction::Racine,
                Fonction::Carre,
                Fonction::Inverse,
                Fonction::Sin,
                Fonction::Cos,
                Fonction::Tan,
                Fonction::Ln,
                Fonction::Log10,
            ] {
                self.bouton(ui, f.libelle(), Action::Fonction(f));
            }
        });
        ui.horizontal(|ui| {
            self.bouton(ui, "mc", Action::Memoire(ActionMemoire::Effacer));
            self.bouton(ui, "mr", Action::Memoire(ActionMemoire::Rappeler));
            self.bouton(ui, "m+", Action::Memoire(ActionMemoire::Ajouter));
            self.bouton(ui, "m−", Action::Memoire(ActionMemoire::Soustraire));
        });

        ui.add_space(6.0);

        egui::Grid::new("pave")
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton(ui, "C", Action::Effacer);
                self.bouton(ui, "(", Action::Parenthese(Cote::Gauche));
                self.bouton(ui, ")", Action::Parenthese(Cote::Droite));
                self.bouton(ui, "÷", Action::Operateur(Operateur::Divise));
                ui.end_row();

                // chaque rangée de chiffres se termine par son opérateur
                for (rangee, op) in [
                    (['7', '8', '9'], Operateur::Fois),
                    (['4', '5', '6'], Operateur::Moins),
                    (['1', '2', '3'], Operateur::Plus),
                ] {
                    for d in rangee {
                        self.bouton(ui, &d.to_string(), Action::Chiffre(d));
                    }
                    self.bouton(ui, op.symbole(), Action::Operateur(op));
                    ui.end_row();
                }

                self.bouton(ui, "±", Action::ChangerSigne);
                self.bouton(ui, "0", Action::Chiffre('0'));
                self.bouton(ui, ".", Action::Point);
                self.bouton(ui, "=", Action::Egal);
                ui.end_row();

                self.bouton(ui, "%", Action::Pourcent);
                self.bouton(ui, "⌫", Action::Retour);
                ui.end_row();
            });
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Rechercher :");
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.recherche)
                    .desired_width(ui.available_width())
                    .hint_text("expression ou résultat"),
            );
            if resp.changed() {
                self.borner_recherche();
            }
        });
        ui.add_space(6.0);

        let chiffres = self.ctrl.reglages().chiffres_fraction;

        // On collecte d’abord : les clics modifient l’historique.
        let lignes: Vec<(u64, String, String, bool)> = self
            .entrees_filtrees()
            .into_iter()
            .map(|e| {
                (
                    e.id,
                    e.expression.clone(),
                    format_nombre_avec(e.resultat, chiffres),
                    e.epingle,
                )
            })
            .collect();

        if lignes.is_empty() {
            ui.weak("Aucun calcul.");
            return;
        }

        let mut a_reutiliser = None;
        let mut a_epingler = None;
        let mut a_supprimer = None;

        for (id, expression, resultat, epingle) in lignes {
            ui.push_id(id, |ui| {
                ui.horizontal(|ui| {
                    let epingle_txt = if epingle { "📌" } else { "○" };
                    if ui
                        .small_button(epingle_txt)
                        .on_hover_text("Épingler / désépingler")
                        .clicked()
                    {
                        a_epingler = Some(id);
                    }
                    if ui
                        .link(format!("{expression} = {resultat}"))
                        .on_hover_text("Réutiliser le résultat")
                        .clicked()
                    {
                        a_reutiliser = Some(id);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖").on_hover_text("Supprimer").clicked() {
                            a_supprimer = Some(id);
                        }
                    });
                });
            });
        }

        if let Some(id) = a_epingler {
            self.ctrl.toggle_pin(id);
        }
        if let Some(id) = a_supprimer {
            self.ctrl.delete_history(&[id]);
        }
        if let Some(id) = a_reutiliser {
            self.reutiliser(id);
        }
    }

    fn bouton(&mut self, ui: &mut egui::Ui, label: &str, action: Action) {
        let resp = ui.add_sized(TOUCHE, egui::Button::new(label));
        if resp.clicked() {
            self.touche(action);
        }
    }

    /// Clavier physique. Ignoré quand un champ texte (recherche) a le focus.
    fn clavier(&mut self, ui: &mut egui::Ui) {
        if ui.ctx().wants_keyboard_input() {
            return;
        }

        let evenements = ui.input(|i| i.events.clone());
        for ev in evenements {
            match ev {
                egui::Event::Text(texte) => {
                    for c in texte.chars() {
                        if let Some(a) = action_pour_caractere(c) {
                            self.touche(a);
                        }
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => match key {
                    egui::Key::Enter => self.touche(Action::Egal),
                    egui::Key::Backspace => self.touche(Action::Retour),
                    egui::Key::Escape => self.touche(Action::Effacer),
                    _ => {}
                },
                _ => {}
            }
        }
    }
}

/// Caractère tapé -> action (None si sans rapport).
fn action_pour_caractere(c: char) -> Option<Action> {
    Some(match c {
        '0'..='9' => Action::Chiffre(c),
        '.' | ',' => Action::Point,
        '+' => Action::Operateur(Operateur::Plus),
        '-' | '−' => Action::Operateur(Operateur::Moins),
        '*' | '×' | 'x' => Action::Operateur(Operateur::Fois),
        '/' | '÷' => Action::Operateur(Operateur::Divise),
        '(' => Action::Parenthese(Cote::Gauche),
        ')' => Action::Parenthese(Cote::Droite),
        '%' => Action::Pourcent,
        '=' => Action::Egal,
        _ => return None,
    })
}
