/// Bootstrap page. Drawing is left to Leaflet; everything it draws comes
/// from `/api/map` already encoded.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Earthquake Map</title>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .info.legend { background: white; padding: 6px 8px; line-height: 18px; }
    .info.legend i { width: 18px; height: 18px; float: left; margin-right: 8px; }
    .cluster-icon { background: rgba(68, 1, 84, 0.7); color: white; border-radius: 50%;
                    text-align: center; line-height: 36px; font-weight: bold; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script>
    const api = (path, body) => fetch(path, body === undefined ? {} : {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    }).then(r => r.json());

    const POLL_MS = 2000;

    let map, groups, syncing = false;

    function drawQuakes(view) {
      groups['Earthquakes'].clearLayers();
      if (!view.earthquakes) return;
      for (const item of view.earthquakes.items) {
        if (item.kind === 'marker') {
          const p = item.position;
          L.circleMarker([p.lat, p.lon], item.style).bindPopup(item.style.popup).addTo(groups['Earthquakes']);
        } else {
          const icon = L.divIcon({ className: 'cluster-icon', html: String(item.count), iconSize: [36, 36] });
          const b = item.bounds;
          L.marker([item.center.lat, item.center.lon], { icon })
            .on('click', () => map.fitBounds([[b.south_west.lat, b.south_west.lon], [b.north_east.lat, b.north_east.lon]]))
            .addTo(groups['Earthquakes']);
        }
      }
    }

    function drawPlates(view) {
      groups['Tectonic Plates'].clearLayers();
      if (!view.boundaries) return;
      const style = { color: view.boundaries.style.color, weight: view.boundaries.style.weight };
      for (const f of view.boundaries.features) {
        L.geoJSON(f.geometry, { style }).bindPopup(f.popup).addTo(groups['Tectonic Plates']);
      }
    }

    // Overlay visibility follows the server, which activates an overlay when
    // its data lands.
    function syncOverlays(view) {
      syncing = true;
      for (const o of view.overlays) {
        const group = groups[o.name];
        if (!group) continue;
        if (o.active && !map.hasLayer(group)) group.addTo(map);
        if (!o.active && map.hasLayer(group)) map.removeLayer(group);
      }
      syncing = false;
    }

    function render(view) {
      syncOverlays(view);
      drawQuakes(view);
      drawPlates(view);
    }

    const refresh = async () => {
      const view = await api('/api/map?zoom=' + map.getZoom());
      render(view);
      return view;
    };

    // Keep polling until every overlay has either data or a failed load.
    async function pollUntilLoaded(view) {
      while (view.overlays.some(o => o.state === 'empty')) {
        await new Promise(resolve => setTimeout(resolve, POLL_MS));
        view = await refresh();
      }
    }

    async function boot() {
      const view = await api('/api/map');
      map = L.map('map').setView([view.center.lat, view.center.lon], view.zoom);

      const bases = {};
      for (const b of view.baseLayers) {
        bases[b.name] = L.tileLayer(b.urlTemplate, { attribution: b.attribution });
      }
      bases[view.activeBase].addTo(map);

      groups = { 'Earthquakes': L.layerGroup(), 'Tectonic Plates': L.layerGroup() };
      const overlays = {};
      for (const o of view.overlays) overlays[o.name] = groups[o.name];
      if (view.showLayerControl) {
        L.control.layers(bases, overlays, { collapsed: false }).addTo(map);
      }

      const legend = L.control({ position: 'bottomright' });
      legend.onAdd = () => {
        const div = L.DomUtil.create('div', 'info legend');
        api('/api/legend').then(l => { div.innerHTML = l.html; });
        return div;
      };
      legend.addTo(map);

      map.on('zoomend', async () => {
        await api('/api/zoom', { zoom: map.getZoom() });
        refresh();
      });
      map.on('baselayerchange', e => api('/api/base/' + encodeURIComponent(e.name), {}));
      map.on('overlayadd', e => {
        if (!syncing) api('/api/overlays/' + encodeURIComponent(e.name), { active: true }).then(refresh);
      });
      map.on('overlayremove', e => {
        if (!syncing) api('/api/overlays/' + encodeURIComponent(e.name), { active: false });
      });

      render(view);
      pollUntilLoaded(view);
    }

    document.addEventListener('DOMContentLoaded', boot);
  </script>
</body>
</html>
"#;
